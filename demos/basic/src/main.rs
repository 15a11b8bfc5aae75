//! Logs a few records at every level through the global text logger.

use mojilog::{Attr, Level, LogFormat};

fn main() {
    mojilog::init_global(Level::DEBUG, LogFormat::Text, true);

    mojilog::debug!("This is a debug message", "component" => "main", "iteration" => 1);
    mojilog::info!(
        "Application started successfully",
        "version" => "1.0.0",
        "env" => "development"
    );
    mojilog::warn(
        "Cache miss detected",
        vec![
            Attr::string("key", "user:123"),
            Attr::string("fallback", "database"),
        ],
    );
    mojilog::error!(
        "Failed to connect to service",
        "service" => "redis",
        "error" => "timeout after 5s"
    );

    let user_log = mojilog::with(vec![
        Attr::string("user_id", "user-123"),
        Attr::string("request_id", "req-456"),
    ]);
    user_log.info("User logged in", vec![Attr::string("ip", "192.168.1.1")]);
    let profile = Attr::string("profile_id", "profile-789");
    user_log.info("User viewed profile", vec![profile]);

    let http = mojilog::with_group("http");
    let attrs = vec![Attr::string("method", "GET"), Attr::new("status", 200)];
    http.info("Request completed", attrs);
}
