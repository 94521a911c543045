use std::collections::BTreeMap;

pub type Tags = BTreeMap<String, String>;

const LENGTH_UNITS: [(&str, f64); 3] = [("km", 1000.0), ("mi", 1609.344), ("m", 1.0)];

pub fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn get_float(tags: &Tags, key: &str) -> Option<f64> {
    tags.get(key).and_then(|v| parse_float(v))
}

/// Length in meters: a bare number, or a number with `m`, `km` or `mi`.
pub fn get_length(tags: &Tags, key: &str) -> Option<f64> {
    let value = tags.get(key)?.trim();
    if let Some(v) = parse_float(value) {
        return Some(v);
    }
    LENGTH_UNITS.iter().find_map(|(suffix, ratio)| {
        let number = value.strip_suffix(suffix)?.trim_end();
        parse_float(number).map(|v| v * ratio)
    })
}
