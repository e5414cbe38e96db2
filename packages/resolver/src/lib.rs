#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Free-text Vietnamese address resolution.
//!
//! A [`Resolver`] walks the administrative hierarchy from the coarsest tier
//! down. At each tier it searches the remaining text for the rightmost
//! keyword of the candidate units, records the unit, and cuts the keyword
//! out so finer tiers only see what is left. Whatever precedes the finest
//! match can be kept as the street.
//!
//! Two layouts are supported, selected by [`Scheme`]:
//!
//! * [`Scheme::Legacy`]: province → district → ward, with obsolete
//!   districts redirected to their successors.
//! * [`Scheme::Current`]: province → ward.
//!
//! Matching is deliberately lenient: text that names nothing known yields an
//! [`AddressUnit`] with the unresolved tiers left empty, never an error.

mod current;
mod legacy;
mod street;
mod working;

use std::sync::Arc;

use thiserror::Error;
use vn_admin_dictionary::{Entry, ReferenceData};
use vn_admin_normalize::normalize_display;
use vn_admin_resolver_models::{AddressUnit, Granularity, Scheme};

/// Errors from [`Resolver::resolve`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid level {level} for {scheme} scheme: expected 1..={max}")]
    InvalidLevel { scheme: Scheme, level: u8, max: u8 },
}

/// Resolves addresses against a shared, immutable [`ReferenceData`].
///
/// Cheap to clone; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct Resolver {
    data: Arc<ReferenceData>,
}

impl Resolver {
    #[must_use]
    pub const fn new(data: Arc<ReferenceData>) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn data(&self) -> &ReferenceData {
        &self.data
    }

    /// Parses `address` into an [`AddressUnit`] of the given scheme.
    ///
    /// `level` selects the finest tier to resolve: 1 province, 2 district
    /// (legacy) or ward (current), 3 ward (legacy only). With `keep_street`
    /// the text before the finest matched unit is returned as the street.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidLevel`] if `level` is outside
    /// `1..=scheme.max_level()`.
    pub fn resolve(
        &self,
        address: &str,
        scheme: Scheme,
        keep_street: bool,
        level: u8,
    ) -> Result<AddressUnit, ResolveError> {
        let granularity = scheme
            .granularity(level)
            .ok_or(ResolveError::InvalidLevel {
                scheme,
                level,
                max: scheme.max_level(),
            })?;

        let display = normalize_display(address);
        log::trace!("Resolving '{display}' ({scheme}, {granularity})");

        let unit = match scheme {
            Scheme::Legacy => legacy::resolve(&self.data.legacy, &display, keep_street, granularity),
            Scheme::Current => {
                current::resolve(&self.data.current, &display, keep_street, granularity)
            }
        };

        if unit.is_empty() {
            log::debug!("Could not resolve '{address}' under {scheme}");
        }

        Ok(unit)
    }
}

/// Records a matched unit on its tier. Coordinates always follow the finest
/// tier set so far.
fn set_tier(unit: &mut AddressUnit, granularity: Granularity, key: &str, entry: &Entry) {
    let component = Some(entry.component(key));
    match granularity {
        Granularity::Province => unit.province = component,
        Granularity::District => unit.district = component,
        Granularity::Ward => unit.ward = component,
    }
    unit.coordinates = entry.coordinates();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> Resolver {
        Resolver::new(Arc::new(ReferenceData::sample().unwrap()))
    }

    fn keys(unit: &AddressUnit) -> (Option<&str>, Option<&str>, Option<&str>) {
        (
            unit.key(Granularity::Province),
            unit.key(Granularity::District),
            unit.key(Granularity::Ward),
        )
    }

    #[test]
    fn rejects_out_of_range_levels() {
        let resolver = resolver();
        for (scheme, level) in [
            (Scheme::Legacy, 0),
            (Scheme::Legacy, 4),
            (Scheme::Current, 0),
            (Scheme::Current, 3),
        ] {
            let err = resolver.resolve("Hà Nội", scheme, false, level).unwrap_err();
            assert!(matches!(err, ResolveError::InvalidLevel { .. }));
        }
    }

    #[test]
    fn invalid_level_message_names_the_range() {
        let err = resolver()
            .resolve("Hà Nội", Scheme::Current, false, 3)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid level 3 for CURRENT scheme: expected 1..=2"
        );
    }

    #[test]
    fn unknown_text_yields_empty_unit() {
        let unit = resolver()
            .resolve("xyz", Scheme::Legacy, true, 3)
            .unwrap();
        assert!(unit.is_empty());
        assert_eq!(unit.scheme, Scheme::Legacy);
        assert!(unit.street.is_none());
        assert!(unit.coordinates.is_none());
    }

    #[test]
    fn empty_input_yields_empty_unit() {
        let unit = resolver().resolve("  ", Scheme::Current, true, 2).unwrap();
        assert!(unit.is_empty());
    }

    #[test]
    fn legacy_full_address_with_street() {
        let unit = resolver()
            .resolve(
                "24 Phố Hàng Bài, Phường Tràng Tiền, Quận Hoàn Kiếm, Hà Nội",
                Scheme::Legacy,
                true,
                3,
            )
            .unwrap();
        assert_eq!(
            keys(&unit),
            (
                Some("thanhphohanoi"),
                Some("quanhoankiem"),
                Some("phuongtrangtien")
            )
        );
        assert_eq!(unit.street.as_deref(), Some("24 Phố Hàng Bài"));
        let coordinates = unit.coordinates.unwrap();
        assert!((coordinates.latitude - 21.0245).abs() < 1e-9);
    }

    #[test]
    fn street_is_dropped_without_keep_street() {
        let unit = resolver()
            .resolve(
                "24 Phố Hàng Bài, Phường Tràng Tiền, Quận Hoàn Kiếm, Hà Nội",
                Scheme::Legacy,
                false,
                3,
            )
            .unwrap();
        assert!(unit.street.is_none());
        assert!(unit.ward.is_some());
    }

    #[test]
    fn rightmost_province_wins() {
        let unit = resolver()
            .resolve(
                "Hoàn Kiếm, Hà Nội, đường Trần Phú, Huế",
                Scheme::Legacy,
                false,
                1,
            )
            .unwrap();
        assert_eq!(unit.key(Granularity::Province), Some("thanhphohue"));
        assert_eq!(
            unit.name(Granularity::Province, false),
            Some("Thành phố Huế")
        );
        assert!(unit.district.is_none());
    }

    #[test]
    fn province_inferred_from_unique_district() {
        let unit = resolver()
            .resolve("Phường 9, Quận 5", Scheme::Legacy, false, 3)
            .unwrap();
        assert_eq!(
            keys(&unit),
            (Some("thanhphohochiminh"), Some("quan5"), Some("phuong9"))
        );
    }

    #[test]
    fn obsolete_district_follows_ward_to_successor() {
        let unit = resolver()
            .resolve(
                "52 Đường Số 4, Linh Chiểu, Quận 9",
                Scheme::Legacy,
                true,
                3,
            )
            .unwrap();
        assert_eq!(
            keys(&unit),
            (
                Some("thanhphohochiminh"),
                Some("thanhphothuduc"),
                Some("phuonglinhchieu")
            )
        );
        assert_eq!(unit.street.as_deref(), Some("52 Đường Số 4"));
    }

    #[test]
    fn obsolete_district_picks_successor_by_ward_keyword() {
        let unit = resolver()
            .resolve("Cổ Nhuế 1, Huyện Từ Liêm, Hà Nội", Scheme::Legacy, false, 3)
            .unwrap();
        assert_eq!(
            keys(&unit),
            (
                Some("thanhphohanoi"),
                Some("quanbactuliem"),
                Some("phuongconhue1")
            )
        );
    }

    #[test]
    fn obsolete_district_without_ward_uses_default_successor() {
        let unit = resolver()
            .resolve("Huyện Từ Liêm, Hà Nội", Scheme::Legacy, false, 2)
            .unwrap();
        assert_eq!(unit.key(Granularity::District), Some("quannamtuliem"));
        assert!(unit.ward.is_none());
    }

    #[test]
    fn mask_hides_ward_that_contains_a_district_name() {
        let unit = resolver()
            .resolve(
                "Phường Thủy Xuân, Thành phố Huế, Thừa Thiên Huế",
                Scheme::Legacy,
                false,
                3,
            )
            .unwrap();
        assert_eq!(
            keys(&unit),
            (
                Some("thanhphohue"),
                Some("quanthuanhoa"),
                Some("phuongthuyxuan")
            )
        );
    }

    #[test]
    fn conditional_mask_applies_on_accented_trigger() {
        let unit = resolver()
            .resolve(
                "Thuận Hoà, Thành phố Huế, Thừa Thiên Huế",
                Scheme::Legacy,
                false,
                3,
            )
            .unwrap();
        assert_eq!(
            keys(&unit),
            (
                Some("thanhphohue"),
                Some("quanthuanhoa"),
                Some("phuongthuanhoa")
            )
        );
    }

    #[test]
    fn district_name_matches_directly_without_trigger() {
        let unit = resolver()
            .resolve(
                "Phường Vĩnh Ninh, Quận Thuận Hóa, Huế",
                Scheme::Legacy,
                false,
                3,
            )
            .unwrap();
        assert_eq!(
            keys(&unit),
            (
                Some("thanhphohue"),
                Some("quanthuanhoa"),
                Some("phuongvinhninh")
            )
        );
    }

    #[test]
    fn divided_city_routes_to_non_default_successor() {
        let unit = resolver()
            .resolve(
                "Phường Phú Hậu, Thành phố Huế, Thừa Thiên Huế",
                Scheme::Legacy,
                false,
                3,
            )
            .unwrap();
        assert_eq!(unit.key(Granularity::District), Some("quanphuxuan"));
        assert_eq!(unit.key(Granularity::Ward), Some("phuongphuhau"));
    }

    #[test]
    fn short_accented_tier_separates_near_homonyms() {
        let resolver = resolver();
        let unit = resolver
            .resolve("Ba Tô, Huyện Ba Tơ, Quảng Ngãi", Scheme::Legacy, false, 3)
            .unwrap();
        assert_eq!(unit.key(Granularity::Ward), Some("xabato"));

        let unit = resolver
            .resolve("Ba Tơ, Huyện Ba Tơ, Quảng Ngãi", Scheme::Legacy, false, 3)
            .unwrap();
        assert_eq!(unit.key(Granularity::Ward), Some("thitranbato"));
    }

    #[test]
    fn street_without_ward_needs_enough_separators() {
        let resolver = resolver();
        let unit = resolver
            .resolve(
                "12 Lê Lợi, Khu phố 3, Quận 5, Hồ Chí Minh",
                Scheme::Legacy,
                true,
                3,
            )
            .unwrap();
        assert!(unit.ward.is_none());
        assert_eq!(unit.street.as_deref(), Some("12 Lê Lợi"));

        let unit = resolver
            .resolve("12 Lê Lợi, Quận 5, Hồ Chí Minh", Scheme::Legacy, true, 3)
            .unwrap();
        assert!(unit.street.is_none());
    }

    #[test]
    fn special_zone_keeps_street_without_ward() {
        let unit = resolver()
            .resolve("Xã An Vĩnh, Huyện Lý Sơn, Quảng Ngãi", Scheme::Legacy, true, 3)
            .unwrap();
        assert_eq!(unit.key(Granularity::District), Some("huyenlyson"));
        assert!(unit.ward.is_none());
        assert_eq!(unit.street.as_deref(), Some("Xã An Vĩnh"));
    }

    #[test]
    fn current_province_and_ward() {
        let unit = resolver()
            .resolve("Phường Lào Cai, Tỉnh Lào Cai", Scheme::Current, false, 2)
            .unwrap();
        assert_eq!(keys(&unit), (Some("tinhlaocai"), None, Some("phuonglaocai")));
    }

    #[test]
    fn current_accented_tier_beats_folded_collision() {
        let resolver = resolver();
        let unit = resolver
            .resolve("Sa Pả, Lào Cai", Scheme::Current, false, 2)
            .unwrap();
        assert_eq!(unit.key(Granularity::Ward), Some("xasapa"));

        let unit = resolver
            .resolve("Sa Pa, Lào Cai", Scheme::Current, false, 2)
            .unwrap();
        assert_eq!(unit.key(Granularity::Ward), Some("phuongsapa"));
    }

    #[test]
    fn current_province_inferred_from_unique_ward() {
        let resolver = resolver();
        let unit = resolver
            .resolve("Lý Sơn", Scheme::Current, false, 2)
            .unwrap();
        assert_eq!(keys(&unit), (Some("tinhquangngai"), None, Some("dackhulyson")));

        let unit = resolver
            .resolve("Sa Pả", Scheme::Current, false, 2)
            .unwrap();
        assert_eq!(keys(&unit), (Some("tinhlaocai"), None, Some("xasapa")));
    }

    #[test]
    fn current_level_one_stops_at_province() {
        let unit = resolver()
            .resolve("Lý Sơn", Scheme::Current, false, 1)
            .unwrap();
        assert_eq!(keys(&unit), (Some("tinhquangngai"), None, None));
        let coordinates = unit.coordinates.unwrap();
        let resolver = resolver();
        let province = resolver.data().current.province("tinhquangngai").unwrap();
        assert_eq!(Some(coordinates), province.coordinates());
    }

    #[test]
    fn legacy_only_district_names_do_not_resolve_under_current() {
        let unit = resolver()
            .resolve("Phường 9, Quận 5", Scheme::Current, false, 2)
            .unwrap();
        assert!(unit.is_empty());
    }

    #[test]
    fn coarser_levels_are_prefixes_of_finer_ones() {
        let resolver = resolver();
        let address = "24 Phố Hàng Bài, Phường Tràng Tiền, Quận Hoàn Kiếm, Hà Nội";
        let fine = resolver.resolve(address, Scheme::Legacy, false, 3).unwrap();
        for level in 1..3 {
            let coarse = resolver.resolve(address, Scheme::Legacy, false, level).unwrap();
            assert_eq!(coarse.province, fine.province);
            if level == 2 {
                assert_eq!(coarse.district, fine.district);
            } else {
                assert!(coarse.district.is_none());
            }
            assert!(coarse.ward.is_none());
        }
    }

    /// Every ward of the sample set as "Ward, District, Province" with the
    /// keys it must resolve to.
    fn sample_wards(resolver: &Resolver, scheme: Scheme) -> Vec<(String, [Option<String>; 3])> {
        let data = resolver.data();
        let mut wards = Vec::new();
        match scheme {
            Scheme::Legacy => {
                let provinces = data.legacy.provinces();
                for province in provinces.keys() {
                    let province_name = &provinces.entry(province).unwrap().name;
                    let Some(districts) = data.legacy.districts(province) else {
                        continue;
                    };
                    for district in districts.keys() {
                        let district_name = &districts.entry(district).unwrap().name;
                        let Some(tiers) = data.legacy.wards(province, district) else {
                            continue;
                        };
                        for (_, scope) in tiers.tiers() {
                            for ward in scope.keys() {
                                let ward_name = &scope.entry(ward).unwrap().name;
                                wards.push((
                                    format!("{ward_name}, {district_name}, {province_name}"),
                                    [
                                        Some(province.to_string()),
                                        Some(district.to_string()),
                                        Some(ward.to_string()),
                                    ],
                                ));
                            }
                        }
                    }
                }
            }
            Scheme::Current => {
                let provinces = data.current.provinces();
                for province in provinces.keys() {
                    let province_name = &provinces.entry(province).unwrap().name;
                    let Some(tiers) = data.current.wards(province) else {
                        continue;
                    };
                    for (_, scope) in tiers.tiers() {
                        for ward in scope.keys() {
                            let ward_name = &scope.entry(ward).unwrap().name;
                            wards.push((
                                format!("{ward_name}, {province_name}"),
                                [Some(province.to_string()), None, Some(ward.to_string())],
                            ));
                        }
                    }
                }
            }
        }
        wards
    }

    #[test]
    fn every_sample_ward_resolves_from_its_own_names() {
        const STREET: &str = "12 Lê Lợi";
        let resolver = resolver();
        for scheme in [Scheme::Legacy, Scheme::Current] {
            let level = scheme.max_level();
            let wards = sample_wards(&resolver, scheme);
            assert!(!wards.is_empty());
            for (address, [province, district, ward]) in wards {
                for keep_street in [false, true] {
                    let input = if keep_street {
                        format!("{STREET}, {address}")
                    } else {
                        address.clone()
                    };
                    let unit = resolver.resolve(&input, scheme, keep_street, level).unwrap();
                    assert_eq!(
                        keys(&unit),
                        (province.as_deref(), district.as_deref(), ward.as_deref()),
                        "{scheme}: {input}"
                    );
                    assert_eq!(
                        unit.street.as_deref(),
                        keep_street.then_some(STREET),
                        "{scheme}: {input}"
                    );

                    let again = resolver
                        .resolve(&unit.address(false), scheme, keep_street, level)
                        .unwrap();
                    assert_eq!(again, unit, "{scheme}: {input}");
                }
            }
        }
    }

    #[test]
    fn masked_ward_does_not_hide_overlapping_district() {
        let resolver = resolver();
        for (address, street) in [
            ("Phường Thuận Hòa, Quận Thuận Hóa, Thành phố Huế", None),
            ("12 Lê Lợi, Phường Thuận Hòa, Quận Thuận Hóa, Thành phố Huế", Some("12 Lê Lợi")),
        ] {
            let unit = resolver.resolve(address, Scheme::Legacy, true, 3).unwrap();
            assert_eq!(
                keys(&unit),
                (
                    Some("thanhphohue"),
                    Some("quanthuanhoa"),
                    Some("phuongthuanhoa")
                ),
                "{address}"
            );
            assert_eq!(unit.street.as_deref(), street, "{address}");
        }
    }

    #[test]
    fn street_drops_leading_separators() {
        let unit = resolver()
            .resolve(
                "  ,Tràng Tiền, , Hoàn Kiếm,, Hà Nội,,",
                Scheme::Current,
                true,
                2,
            )
            .unwrap();
        assert_eq!(
            keys(&unit),
            (Some("thanhphohanoi"), None, Some("phuonghoankiem"))
        );
        assert_eq!(unit.street.as_deref(), Some("Tràng Tiền"));
    }

    #[test]
    fn province_match_ignores_diacritics() {
        let resolver = resolver();
        for scheme in [Scheme::Legacy, Scheme::Current] {
            let plain = resolver.resolve("ha noi", scheme, false, 1).unwrap();
            let accented = resolver.resolve("Hà Nội", scheme, false, 1).unwrap();
            assert_eq!(plain.key(Granularity::Province), Some("thanhphohanoi"));
            assert_eq!(plain, accented);
        }
    }
}
