//! Province → ward resolution over the 2025 34-province layout.

use vn_admin_dictionary::CurrentDictionary;
use vn_admin_resolver_models::{AddressUnit, Granularity, Scheme};

use crate::{set_tier, street};
use crate::working::{KeyKind, Span, WorkingKeys};

const MIN_STREET_SEPARATORS: usize = 2;

pub fn resolve(
    dictionary: &CurrentDictionary,
    display: &str,
    keep_street: bool,
    granularity: Granularity,
) -> AddressUnit {
    let mut unit = AddressUnit::empty(Scheme::Current);
    let mut keys = WorkingKeys::new(display);
    let mut street_cut: Option<usize> = None;

    let province_key = if let Some((span, found, entry)) =
        keys.find(dictionary.provinces(), KeyKind::Loose)
    {
        keys.excise(span);
        set_tier(&mut unit, Granularity::Province, found.key, entry);
        Some(found.key)
    } else {
        infer_from_unique_ward(
            dictionary,
            &mut keys,
            &mut unit,
            granularity,
            &mut street_cut,
        )
    };

    let Some(province_key) = province_key else {
        log::debug!("No province found in '{display}'");
        return unit;
    };
    let mut ward_found = unit.ward.is_some();

    if granularity >= Granularity::Ward
        && !ward_found
        && let Some(tiers) = dictionary.wards(province_key)
    {
        for (tier, scope) in tiers.tiers() {
            let kind = KeyKind::for_accented(tier.uses_accented_key());
            if let Some((span, found, entry)) = keys.find(scope, kind) {
                log::debug!("Matched {} ward keyword '{}'", tier.as_str(), found.keyword);
                set_tier(&mut unit, Granularity::Ward, found.key, entry);
                ward_found = true;
                street_cut = Some(span.start);
                keys.excise(span);
                break;
            }
        }
    }

    if keep_street && (ward_found || keys.separator_count() >= MIN_STREET_SEPARATORS) {
        unit.street = street::extract(display, keys.loose(), street_cut);
    }

    unit
}

/// Falls back to the country-wide unique-ward indexes when no province
/// keyword is present. The matched ward is kept when the requested
/// granularity reaches it.
fn infer_from_unique_ward<'d>(
    dictionary: &'d CurrentDictionary,
    keys: &mut WorkingKeys,
    unit: &mut AddressUnit,
    granularity: Granularity,
    street_cut: &mut Option<usize>,
) -> Option<&'d str> {
    for index in dictionary.unique_wards() {
        let haystack = keys.get(KeyKind::for_accented(index.tier().uses_accented_key()));
        let Some((found, province_key)) = index.rightmost(haystack) else {
            continue;
        };
        let span = Span::of(haystack, &found);
        log::debug!(
            "Inferred province '{province_key}' from unique {} ward '{}'",
            index.tier().as_str(),
            found.key
        );

        let province = dictionary.province(province_key)?;
        set_tier(unit, Granularity::Province, province_key, province);

        if granularity >= Granularity::Ward
            && let Some(ward) = dictionary
                .wards(province_key)
                .and_then(|tiers| tiers.tier(index.tier()))
                .and_then(|scope| scope.entry(found.key))
        {
            set_tier(unit, Granularity::Ward, found.key, ward);
            *street_cut = Some(span.start);
        }
        keys.excise(span);
        return Some(province_key);
    }
    None
}
