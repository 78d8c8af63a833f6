use std::env;

const LOG_LEVEL_ENV: &str = "PATRIMONY_LOG";
const LOG_JSON_ENV: &str = "PATRIMONY_LOG_JSON";

#[tokio::main]
async fn main() {
    let log_level = env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
    let json_logs = env::var(LOG_JSON_ENV).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    patrimony::logging::setup_logging(&log_level, json_logs);

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        if let Err(e) = patrimony::api::run_http_server(port).await {
            tracing::error!(error = %e, "server error");
            std::process::exit(1);
        }
        return;
    }

    // `project` is optional so bare flags also run a projection.
    let args = raw_args
        .iter()
        .enumerate()
        .filter(|(i, arg)| !(*i == 1 && arg.as_str() == "project"))
        .map(|(_, arg)| arg.clone());
    match patrimony::api::run_cli(args) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "projection failed");
            std::process::exit(1);
        }
    }
}
