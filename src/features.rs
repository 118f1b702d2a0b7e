use chrono::{DateTime, Datelike, Duration, Local, NaiveDateTime, Timelike};

/// All junction names the model was trained on, in training-column order.
/// This list is fixed at deployment time; adding or reordering entries
/// invalidates the serialized model.
pub const INTERSECTIONS: [&str; 16] = [
    "Intersection_100 Feet Road",
    "Intersection_Anil Kumble Circle",
    "Intersection_Ballari Road",
    "Intersection_CMH Road",
    "Intersection_Hebbal Flyover",
    "Intersection_Hosur Road",
    "Intersection_ITPL Main Road",
    "Intersection_Jayanagar 4th Block",
    "Intersection_Marathahalli Bridge",
    "Intersection_Sarjapur Road",
    "Intersection_Silk Board Junction",
    "Intersection_Sony World Junction",
    "Intersection_South End Circle",
    "Intersection_Trinity Circle",
    "Intersection_Tumkur Road",
    "Intersection_Yeshwanthpur Circle",
];

/// Calendar-derived fields, ahead of the junction indicators.
pub const CALENDAR_FIELDS: [&str; 4] = ["hour", "day_of_week", "month", "is_weekend"];

/// Total model input width: 4 calendar fields + one indicator per junction.
pub const FEATURE_COUNT: usize = CALENDAR_FIELDS.len() + INTERSECTIONS.len();

/// Authoritative input column order, calendar fields first.
pub fn feature_names() -> Vec<String> {
    CALENDAR_FIELDS
        .iter()
        .chain(INTERSECTIONS.iter())
        .map(|s| s.to_string())
        .collect()
}

pub fn is_known_junction(name: &str) -> bool {
    INTERSECTIONS.contains(&name)
}

/// Encode (timestamp, junction) into the fixed-order feature vector.
///
/// Day-of-week is 0 = Monday .. 6 = Sunday; weekend means Saturday or
/// Sunday. An unknown junction leaves every indicator at zero and logs a
/// warning rather than failing the request.
pub fn encode(when: NaiveDateTime, junction: &str) -> Vec<f32> {
    let day_of_week = when.weekday().num_days_from_monday();
    let is_weekend = if day_of_week >= 5 { 1.0 } else { 0.0 };

    let mut v = Vec::with_capacity(FEATURE_COUNT);
    v.push(when.hour() as f32);
    v.push(day_of_week as f32);
    v.push(when.month() as f32);
    v.push(is_weekend);

    let mut matched = false;
    for name in INTERSECTIONS {
        let hit = name == junction;
        matched |= hit;
        v.push(if hit { 1.0 } else { 0.0 });
    }
    if !matched {
        tracing::warn!("unknown junction '{}'; indicator columns left at zero", junction);
    }
    v
}

/// Resolve the request's free-text time descriptor to a local timestamp.
///
/// Accepts RFC 3339 and `YYYY-MM-DD HH:MM:SS`, plus the phrases the
/// frontend sends ("Now", "Next Hour"). Anything else falls back to the
/// current time with a warning.
pub fn resolve_prediction_time(descriptor: &str) -> NaiveDateTime {
    if let Ok(dt) = DateTime::parse_from_rfc3339(descriptor) {
        return dt.with_timezone(&Local).naive_local();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(descriptor, "%Y-%m-%d %H:%M:%S") {
        return dt;
    }

    let now = Local::now().naive_local();
    match descriptor.trim().to_ascii_lowercase().as_str() {
        "now" => now,
        "next hour" => now + Duration::hours(1),
        other => {
            tracing::warn!("unrecognized prediction time '{}'; using current time", other);
            now
        }
    }
}
