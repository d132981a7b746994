#[cfg(test)]
mod tests {
    use diagnosee_api::shared::util::config::{parse_config, StorageBackend};

    #[test]
    fn minimal_config_gets_defaults() {
        let config = parse_config("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.request_quota, 20);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.retention_seconds, None, "no retention unless configured");
        assert!(config.database.is_none());
    }

    #[test]
    fn postgres_config() {
        let config = parse_config(r#"
            [server]
            port = 8080
            log = true

            [storage]
            backend = "postgres"
            retention_seconds = 3600

            [database]
            ip = "db"
            port = 5432
            user = "svc"
            password = "pw"
            name = "demo"
        "#).unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.storage.retention_seconds, Some(3600));
        let database = config.database.unwrap();
        assert_eq!(database.url(), "postgres://svc:pw@db:5432/demo");
        assert_eq!(database.max_connections, 5);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(parse_config("[server]\nport = 1\n[storage]\nbackend = \"redis\"\n").is_err());
    }
}
