/// A ready-made endpoint + path pair offered by the example picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub url: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "bitcoin",
        url: "https://api.coindesk.com/v1/bpi/currentprice.json",
        path: "bpi.USD.rate_float",
        description: "Bitcoin price in USD",
    },
    Preset {
        name: "iss",
        url: "http://api.open-notify.org/iss-now.json",
        path: "iss_position.latitude",
        description: "ISS latitude (string field, parsed as a number)",
    },
    Preset {
        name: "random-user",
        url: "https://randomuser.me/api/",
        path: "results[0].login.uuid",
        // Array-indexed path: always resolves to absent and plots 0.
        description: "Random user id",
    },
    Preset {
        name: "people-in-space",
        url: "http://api.open-notify.org/astros.json",
        path: "number",
        description: "Number of people currently in space",
    },
];

pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_number;
    use serde_json::json;

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("Bitcoin").map(|p| p.path), Some("bpi.USD.rate_float"));
        assert_eq!(find(" iss ").map(|p| p.name), Some("iss"));
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_names_unique() {
        for (i, a) in PRESETS.iter().enumerate() {
            assert!(PRESETS[i + 1..].iter().all(|b| b.name != a.name));
        }
    }

    #[test]
    fn test_iss_string_latitude_parses() {
        let body = json!({"iss_position": {"latitude": "-12.3456", "longitude": "1.0"}});
        assert_eq!(extract_number(&body, find("iss").unwrap().path), -12.3456);
    }

    #[test]
    fn test_random_user_path_resolves_to_zero() {
        let body = json!({"results": [{"login": {"uuid": "1c8a4e2b"}}]});
        assert_eq!(extract_number(&body, find("random-user").unwrap().path), 0.0);
    }
}
