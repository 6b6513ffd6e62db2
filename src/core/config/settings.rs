use super::parsing::{
    env_optional, env_or_default, parse_base_url, parse_bool, parse_cors_origins,
    parse_environment, parse_u64,
};
use super::types::{
    ApiSettings, ConfigError, CorsSettings, ExamApiSettings, ExportSettings, RuntimeSettings,
    ServerHost, ServerPort, ServerSettings, Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("RESULTS_HOST", "0.0.0.0");
        let port = env_or_default("RESULTS_PORT", "8010");

        let environment =
            parse_environment(env_optional("RESULTS_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("RESULTS_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Skill Exam Results");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let base_url = parse_base_url(
            "EXAM_API_URL",
            env_or_default("EXAM_API_URL", "http://localhost:8080/api"),
        )?;
        let token = env_or_default("EXAM_API_TOKEN", "");
        let forward_auth =
            env_optional("EXAM_API_FORWARD_AUTH").map(|value| parse_bool(&value)).unwrap_or(true);
        let timeout_seconds = parse_u64(
            "EXAM_API_TIMEOUT_SECONDS",
            env_or_default("EXAM_API_TIMEOUT_SECONDS", "30"),
        )?;

        let default_filename = env_or_default("EXPORT_FILENAME", "Студенты.xlsx");

        let log_level = env_or_default("RESULTS_LOG_LEVEL", "info");
        let json = env_optional("RESULTS_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            cors: CorsSettings { origins: cors_origins },
            exam_api: ExamApiSettings { base_url, token, forward_auth, timeout_seconds },
            export: ExportSettings { default_filename },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn exam_api(&self) -> &ExamApiSettings {
        &self.exam_api
    }

    pub(crate) fn export(&self) -> &ExportSettings {
        &self.export
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.exam_api.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "EXAM_API_TIMEOUT_SECONDS",
                value: String::from("0"),
            });
        }

        if !self.export.default_filename.ends_with(".xlsx") {
            return Err(ConfigError::InvalidValue {
                field: "EXPORT_FILENAME",
                value: self.export.default_filename.clone(),
            });
        }

        if !self.runtime.strict_config {
            return Ok(());
        }

        // Without forwarding, every backend call relies on the service token.
        if !self.exam_api.forward_auth && self.exam_api.token.is_empty() {
            return Err(ConfigError::MissingSecret("EXAM_API_TOKEN"));
        }

        Ok(())
    }
}
