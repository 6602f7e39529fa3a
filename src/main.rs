use std::collections::HashMap;
use std::env::args;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use fluent::bundle::FluentBundle;
use fluent::{FluentArgs, FluentValue};
use lingora::locale::LOCALES;
use lingora::models::store::ContentStore;
use lingora::models::user::{AdminUser, Role};
use lingora::web::app::App;
use lingora::web::state::AppState;
use lingora::AppConfig;
use minijinja::{path_loader, Environment, State};
use tracing::Level;

#[tokio::main]
async fn main() {
    let args: Vec<String> = args().collect();
    if args.len() < 2 {
        println!(
            "usage: {} CFG",
            args.first().unwrap_or(&"lingora".to_string())
        );
        exit(1);
    }

    let cfg: AppConfig = AppConfig::new_from_file_and_env(args[1].as_ref()).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        exit(1);
    });

    // initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    tracing::debug!("config: {:?}", cfg);

    let template_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
    let mut env = Environment::new();
    minijinja_contrib::add_to_environment(&mut env);

    fn cachebuster(value: String) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        format!("{}?{}", value, timestamp)
    }
    env.add_filter("cachebuster", cachebuster);

    fn ftl_get_message(state: &State, message_id: String) -> String {
        // Get the current language from template context
        let lang = match state.lookup("ftl_lang") {
            Some(lang_val) => lang_val.as_str().unwrap_or("en").to_string(),
            None => "en".to_string(),
        };

        // Get the appropriate Fluent resource
        let ftl = LOCALES
            .get(&lang)
            .unwrap_or_else(|| LOCALES.get("en").unwrap());

        // Create bundle
        let mut bundle = FluentBundle::new_concurrent(vec![lang.parse().unwrap()]);
        bundle.add_resource(ftl).expect("Failed to add a resource.");

        // Get and format the message
        match bundle.get_message(&message_id) {
            Some(message) => match message.value() {
                Some(pattern) => bundle
                    .format_pattern(pattern, None, &mut vec![])
                    .to_string(),
                None => message_id,
            },
            None => message_id,
        }
    }
    env.add_function("ftl_get_message", ftl_get_message);

    fn ftl_format_pattern(
        state: &State,
        message_id: String,
        params: minijinja::Value,
    ) -> Result<String, minijinja::Error> {
        // Get the current language from template context
        let lang = match state.lookup("ftl_lang") {
            Some(lang_val) => lang_val.as_str().unwrap_or("en").to_string(),
            None => "en".to_string(),
        };

        // Get the appropriate Fluent resource
        let ftl = LOCALES
            .get(&lang)
            .unwrap_or_else(|| LOCALES.get("en").unwrap());

        // Create bundle
        let mut bundle = FluentBundle::new_concurrent(vec![lang.parse().unwrap()]);
        bundle.add_resource(ftl).expect("Failed to add a resource.");

        // Convert minijinja values to FluentArgs by deserializing to HashMap
        let mut args = FluentArgs::new();

        if let Ok(map) = serde_json::from_value::<HashMap<String, serde_json::Value>>(
            serde_json::to_value(&params).map_err(|e| {
                minijinja::Error::new(
                    minijinja::ErrorKind::InvalidOperation,
                    format!("Failed to serialize params: {}", e),
                )
            })?,
        ) {
            for (key, value) in map {
                let fluent_value = match value {
                    serde_json::Value::String(s) => FluentValue::from(s),
                    serde_json::Value::Number(n) => {
                        if let Some(i) = n.as_i64() {
                            FluentValue::from(i)
                        } else if let Some(f) = n.as_f64() {
                            FluentValue::from(f)
                        } else {
                            FluentValue::from(n.to_string())
                        }
                    }
                    _ => FluentValue::from(value.to_string()),
                };
                args.set(key, fluent_value);
            }
        }

        // Get and format the message
        match bundle.get_message(&message_id) {
            Some(message) => match message.value() {
                Some(pattern) => Ok(bundle
                    .format_pattern(pattern, Some(&args), &mut vec![])
                    .to_string()),
                None => Ok(message_id),
            },
            None => Ok(message_id),
        }
    }
    env.add_function("ftl_format_pattern", ftl_format_pattern);

    env.set_loader(path_loader(&template_path));

    let admin = AdminUser::new(
        cfg.admin_login_name.clone(),
        cfg.admin_password_hash.clone(),
        "Administrator",
        format!("{}@localhost", cfg.admin_login_name),
        Role::Admin,
    );

    let state = AppState {
        config: cfg,
        env,
        content: Arc::new(ContentStore::seeded(admin)),
    };

    App::new(state).await.unwrap().serve().await.unwrap()
}
