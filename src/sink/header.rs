use crate::config::LogConfig;
use chrono::NaiveDate;

const KEY_WIDTH: usize = 19;

/// Static facts written at the top of every new log file.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    host_name: String,
    os: &'static str,
    arch: &'static str,
    app_name: String,
    app_version: String,
    extra: Vec<(String, String)>,
}

impl HeaderInfo {
    pub fn from_config(config: &LogConfig) -> Self {
        let host_name = hostname::get()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|e| {
                tracing::debug!("Host name unavailable for log header: {}", e);
                "unknown".to_string()
            });

        Self {
            host_name,
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            app_name: config.settings().app_name.clone(),
            app_version: config.settings().app_version.clone(),
            extra: config.extra_head().to_vec(),
        }
    }

    pub fn render(&self, date: NaiveDate) -> String {
        let border = "************* Log Head ****************\n";
        let mut out = String::with_capacity(512);
        out.push_str(border);
        push_line(&mut out, "Date of Log", &date.format("%Y_%m_%d").to_string());
        push_line(&mut out, "Host Name", &self.host_name);
        push_line(&mut out, "OS", self.os);
        push_line(&mut out, "Architecture", self.arch);
        push_line(&mut out, "App Name", &self.app_name);
        push_line(&mut out, "App Version", &self.app_version);
        for (key, value) in &self.extra {
            push_line(&mut out, key, value);
        }
        out.push_str(border);
        out.push('\n');
        out
    }
}

fn push_line(out: &mut String, key: &str, value: &str) {
    if key.is_empty() || value.is_empty() {
        return;
    }
    out.push_str(&format!("{key:<width$}: {value}\n", width = KEY_WIDTH));
}
