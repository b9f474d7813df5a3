//! Rendering of sessions and notifications for the terminal

use crate::session::{Notification, Session};
use serde::Serialize;
use std::fmt::Write;

/// Distance with two decimals, e.g. `"2.53 km"`
pub fn format_distance(km: f64) -> String {
    format!("{km:.2} km")
}

/// Human-readable multi-line summary of a session
pub fn render_session(session: &Session) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Status:       {}", session.phase());

    match session.current_location() {
        Some(here) => {
            let _ = write!(out, "You are at:   {here}");
            if let Some(label) = session.current_location_address() {
                let _ = write!(out, " {label}");
            }
            out.push('\n');
        }
        None => {
            let _ = writeln!(out, "You are at:   unknown");
        }
    }

    if let Some(code) = session.target_postal_code() {
        let _ = writeln!(out, "CEP:          {}", code.formatted());
    }
    if let Some(address) = session.target_address() {
        let _ = writeln!(out, "Address:      {}", address.geocoding_query());
        if let Some(target) = address.coordinate {
            let _ = writeln!(out, "Located at:   {target}");
        }
    }
    if let Some(km) = session.distance_km() {
        let _ = writeln!(out, "Distance:     {}", format_distance(km));
    }
    out
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    session: &'a Session,
    notifications: &'a [Notification],
}

/// Session plus the notifications raised while producing it
pub fn render_json(
    session: &Session,
    notifications: &[Notification],
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonOutput {
        session,
        notifications,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::NotificationKind;

    #[test]
    fn test_format_distance_two_decimals() {
        assert_eq!(format_distance(2.5349), "2.53 km");
        assert_eq!(format_distance(0.0), "0.00 km");
        assert_eq!(format_distance(10007.543), "10007.54 km");
    }

    #[test]
    fn test_render_empty_session() {
        let text = render_session(&Session::new());
        assert!(text.contains("Status:       idle"));
        assert!(text.contains("You are at:   unknown"));
        assert!(!text.contains("Distance"));
    }

    #[test]
    fn test_render_json_shape() {
        let notifications = vec![Notification::new(NotificationKind::PermissionDenied)];
        let json = render_json(&Session::new(), &notifications).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["session"]["phase"], "idle");
        assert!(value["session"]["distance_km"].is_null());
        assert_eq!(value["notifications"][0]["kind"], "permission_denied");
    }
}
