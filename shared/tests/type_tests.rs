/// Integration-level tests for the `shared` crate.
///
/// Each section tests one module; unit tests that are tightly coupled to
/// private helpers live inside the modules themselves (see `#[cfg(test)]`
/// blocks in `json_error.rs`, `login.rs` and `client_config.rs`).
// ---------------------------------------------------------------------------
// User types
// ---------------------------------------------------------------------------
#[cfg(test)]
mod user_tests {
    use shared::types::*;

    fn profile_json() -> serde_json::Value {
        serde_json::json!({
            "id": "u-1",
            "email": "alice@example.com",
            "name": "Alice Liddell",
            "pictureUrl": null,
            "role": "SUPER_ADMIN",
            "ssoEnabled": true
        })
    }

    #[test]
    fn profile_maps_backend_field_names() {
        let p: UserProfile = serde_json::from_value(profile_json()).unwrap();
        assert_eq!(p.id, "u-1");
        assert_eq!(p.display_name.as_deref(), Some("Alice Liddell"));
        assert!(p.avatar_url.is_none());
        assert_eq!(p.role, Role::SuperAdmin);
        assert!(p.sso_enabled);
    }

    #[test]
    fn greeting_uses_first_name_or_fallback() {
        let mut p: UserProfile = serde_json::from_value(profile_json()).unwrap();
        assert_eq!(p.greeting_name(), "Alice");
        p.display_name = None;
        assert_eq!(p.greeting_name(), "User");
    }

    #[test]
    fn role_wire_names() {
        for (role, wire) in [
            (Role::User, "USER"),
            (Role::Admin, "ADMIN"),
            (Role::SuperAdmin, "SUPER_ADMIN"),
        ] {
            assert_eq!(serde_json::to_value(role).unwrap(), wire);
            assert_eq!(wire.parse::<Role>().unwrap(), role);
        }
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn only_admin_roles_are_admin() {
        assert!(!Role::User.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(Role::SuperAdmin.is_admin());
    }

    #[test]
    fn new_user_serializes_camel_case() {
        let body = NewUser {
            email: "bob@example.com".into(),
            name: None,
            role: Role::Admin,
            sso_enabled: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["ssoEnabled"], true);
        assert_eq!(json["role"], "ADMIN");
        assert!(json["name"].is_null());
    }

    #[test]
    fn user_row_tolerates_missing_created_at() {
        let json = r#"{"id":"1","email":"a@b.c","name":null,"role":"USER","ssoEnabled":false}"#;
        let row: UserRow = serde_json::from_str(json).unwrap();
        assert!(row.created_at.is_none());
    }
}

// ---------------------------------------------------------------------------
// Vehicle types
// ---------------------------------------------------------------------------

#[cfg(test)]
mod vehicle_tests {
    use shared::types::*;

    #[test]
    fn search_response_keeps_unknown_record_fields() {
        let json = r#"{
            "success": true,
            "fromCache": true,
            "registrationNumber": "MH******34",
            "data": {"owner": "A", "brandNewField": {"nested": [1, 2]}}
        }"#;
        let r: VehicleSearchResponse = serde_json::from_str(json).unwrap();
        assert!(r.success);
        assert!(r.is_cached());
        let data = r.data.unwrap();
        assert_eq!(data["owner"], "A");
        assert!(data.contains_key("brandNewField"));
    }

    #[test]
    fn failed_response_carries_message_only() {
        let r = VehicleSearchResponse::failed("Search failed.");
        assert!(!r.success);
        assert!(!r.is_cached());
        assert!(r.data.is_none());
        assert_eq!(r.error_message.as_deref(), Some("Search failed."));
    }

    #[test]
    fn search_request_uses_backend_field_name() {
        let body = VehicleSearchRequest {
            registration_number: "KA01AB1234".into(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"registrationNumber":"KA01AB1234"}"#);
    }

    #[test]
    fn rate_limit_info_defaults_to_unconfigured() {
        let json = r#"{"remainingSearchesToday":3,"dailyLimit":10}"#;
        let info: RateLimitInfo = serde_json::from_str(json).unwrap();
        assert!(!info.admin_configured);
        assert_eq!(info.remaining_searches_today, 3);
    }
}

// ---------------------------------------------------------------------------
// Admin types
// ---------------------------------------------------------------------------

#[cfg(test)]
mod admin_tests {
    use shared::types::*;

    #[test]
    fn config_update_copies_editable_fields() {
        let json = r#"{
            "id": "global",
            "cacheTtlDays": 30,
            "rateLimitPerSecond": 2,
            "rateLimitPerDayDefault": 100,
            "updatedAt": "2026-03-01T10:00:00Z",
            "updatedBy": "admin@example.com"
        }"#;
        let cfg: AppConfig = serde_json::from_str(json).unwrap();
        let update = AppConfigUpdate::from(&cfg);
        assert_eq!(update.cache_ttl_days, 30);
        assert_eq!(update.rate_limit_per_second, 2);
        assert_eq!(update.rate_limit_per_day_default, 100);

        let body = serde_json::to_value(update).unwrap();
        assert_eq!(body["rateLimitPerDayDefault"], 100);
        assert!(body.get("updatedBy").is_none());
    }

    #[test]
    fn known_outcomes_parse_to_variants() {
        for (wire, outcome) in [
            ("SUCCESS", SearchOutcome::Success),
            ("CACHE_HIT", SearchOutcome::CacheHit),
            ("NO_DATA", SearchOutcome::NoData),
            ("API_ERROR", SearchOutcome::ApiError),
            ("RATE_LIMITED", SearchOutcome::RateLimited),
            ("COOLDOWN", SearchOutcome::Cooldown),
            ("DAILY_LIMIT_REACHED", SearchOutcome::DailyLimitReached),
        ] {
            let parsed: SearchOutcome = serde_json::from_value(wire.into()).unwrap();
            assert_eq!(parsed, outcome);
            assert_eq!(serde_json::to_value(&parsed).unwrap(), wire);
        }
    }

    #[test]
    fn unknown_outcome_is_preserved() {
        let parsed: SearchOutcome = serde_json::from_value("RATE_LIMIT_PER_SECOND".into()).unwrap();
        assert_eq!(parsed, SearchOutcome::Other("RATE_LIMIT_PER_SECOND".into()));
        assert_eq!(parsed.to_string(), "RATE_LIMIT_PER_SECOND");
        assert!(!parsed.is_success());
    }

    #[test]
    fn search_log_page_deserializes() {
        let json = r#"{
            "content": [{
                "id": "l1",
                "userId": "u1",
                "userEmail": "a@b.c",
                "registrationNumber": "MH12AB1234",
                "details": "CACHE_HIT",
                "fromCache": true,
                "createdAt": "2026-02-03T04:05:06Z"
            }],
            "totalElements": 41,
            "totalPages": 3,
            "number": 0,
            "size": 20,
            "last": false
        }"#;
        let page: Page<SearchLogEntry> = serde_json::from_str(json).unwrap();
        assert!(page.is_first());
        assert!(!page.last);
        assert_eq!(page.content[0].outcome, SearchOutcome::CacheHit);
        assert!(page.content[0].outcome.is_success());
    }

    #[test]
    fn stats_default_top_searchers_to_empty() {
        let json = r#"{"totalSearches":5,"todaySearches":1,"uniqueUsers":2,"uniqueRegNumbers":4}"#;
        let stats: SearchStats = serde_json::from_str(json).unwrap();
        assert!(stats.top_searchers.is_empty());
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

#[cfg(test)]
mod config_tests {
    use shared::config::load_config;
    use shared::types::ConfigError;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_full_document() {
        let file = write_config(
            r#"
            [api]
            base_url = "https://rc.example.com/api/"
            timeout_ms = 5000

            [auth]
            identity_timeout_ms = 2000
            watchdog_secs = 6

            [search]
            max_recent = 8
            log_page_size = 50
            "#,
        );
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.api.timeout_ms, 5000);
        assert_eq!(cfg.auth.watchdog_secs, 6);
        assert_eq!(cfg.search.max_recent, 8);
        assert_eq!(cfg.search.log_page_size, 50);
    }

    #[test]
    fn empty_file_is_rejected() {
        let file = write_config("   \n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn watchdog_must_outlast_identity_timeout() {
        let file = write_config("[auth]\nidentity_timeout_ms = 9000\nwatchdog_secs = 5\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_recent_capacity_is_rejected() {
        let file = write_config("[search]\nmax_recent = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let file = write_config("[api\nbase_url = ");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_config("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
