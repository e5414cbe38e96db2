//! Province → district → ward resolution over the 63-province layout.

use vn_admin_dictionary::LegacyDictionary;
use vn_admin_resolver_models::{AddressUnit, Granularity, Scheme};

use crate::{set_tier, street};
use crate::working::{KeyKind, Span, WorkingKeys};

/// Separators needed before an address without a ward is assumed to carry a
/// street.
const MIN_STREET_SEPARATORS: usize = 3;

pub fn resolve(
    dictionary: &LegacyDictionary,
    display: &str,
    keep_street: bool,
    granularity: Granularity,
) -> AddressUnit {
    let mut unit = AddressUnit::empty(Scheme::Legacy);
    let mut keys = WorkingKeys::new(display);

    let mut district_key: Option<&str> = None;
    let mut ward_found = false;
    let mut street_cut: Option<usize> = None;

    let province = if let Some((span, found, entry)) = keys.find(dictionary.provinces(), KeyKind::Loose) {
        keys.excise(span);
        Some((found.key, entry))
    } else if let Some((found, province_key)) = dictionary.unique_districts().rightmost(keys.loose()) {
        log::debug!("Inferred province '{province_key}' from unique district '{}'", found.key);
        let span = Span::of(keys.loose(), &found);
        district_key = Some(found.key);
        keys.excise(span);
        dictionary
            .provinces()
            .entry(province_key)
            .map(|entry| (province_key, entry))
    } else {
        None
    };

    let Some((province_key, province_entry)) = province else {
        log::debug!("No province found in '{display}'");
        return unit;
    };
    set_tier(&mut unit, Granularity::Province, province_key, province_entry);

    if granularity >= Granularity::District {
        district_key = resolve_district(dictionary, &mut keys, province_key, district_key, &mut street_cut);

        if let Some(key) = district_key {
            match dictionary.district(province_key, key) {
                Some(entry) => set_tier(&mut unit, Granularity::District, key, entry),
                None => district_key = None,
            }
        }
    } else {
        district_key = None;
    }

    if granularity >= Granularity::Ward
        && let Some(district) = district_key
        && let Some(tiers) = dictionary.wards(province_key, district)
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

    let special_zone = district_key.is_some_and(|d| dictionary.is_special_zone(d));
    if keep_street
        && (ward_found || keys.separator_count() >= MIN_STREET_SEPARATORS || special_zone)
    {
        unit.street = street::extract(display, keys.loose(), street_cut);
    }

    unit
}

/// District stage. Returns the resolved district key, which for an
/// obsolete district is one of its successors.
fn resolve_district<'d>(
    dictionary: &'d LegacyDictionary,
    keys: &mut WorkingKeys,
    province_key: &str,
    inferred: Option<&'d str>,
    street_cut: &mut Option<usize>,
) -> Option<&'d str> {
    let divided = dictionary.divided(province_key);
    let mut district_key = inferred;
    let mut obsolete: Option<&'d str> = None;

    if district_key.is_none() {
        let masked = dictionary.mask(province_key).map_or_else(
            || keys.loose().to_string(),
            |rule| keys.masked_loose(&rule.active_keywords(keys.accented())),
        );

        if let Some(scope) = dictionary.districts(province_key)
            && let Some((found, _)) = scope.rightmost(&masked)
        {
            keys.excise(Span::of(&masked, &found));
            district_key = Some(found.key);
        } else if let Some(found) = divided.and_then(|d| d.rightmost(&masked)) {
            log::debug!("Matched obsolete district '{}'", found.key);
            keys.excise(Span::of(&masked, &found));
            obsolete = Some(found.key);
        }
    }

    if let Some(key) = district_key
        && divided.is_some_and(|d| d.district(key).is_some())
    {
        obsolete = Some(key);
    }

    let Some(obsolete) = obsolete else {
        return district_key;
    };
    let scope = divided?.district(obsolete)?;

    if let Some(found) = scope.successor_for(keys.loose()) {
        log::debug!(
            "Obsolete district '{obsolete}' resolved to '{}' via ward keyword '{}'",
            found.key,
            found.keyword
        );
        *street_cut = Some(Span::of(keys.loose(), &found).start);
        Some(found.key)
    } else {
        log::debug!(
            "Obsolete district '{obsolete}' resolved to default '{}'",
            scope.default_successor()
        );
        Some(scope.default_successor())
    }
}
