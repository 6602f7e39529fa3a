use std::collections::HashMap;
use std::fmt;

use fluent::bundle::FluentBundle;
use fluent::{FluentArgs, FluentResource};
use fluent_langneg::convert_vec_str_to_langids_lossy;
use fluent_langneg::negotiate_languages;
use fluent_langneg::parse_accepted_languages;
use fluent_langneg::NegotiationStrategy;
use intl_memoizer::concurrent::IntlLangMemoizer;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

/// Languages the site ships translations for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    La,
    Ja,
    Ko,
    Zh,
    Th,
    Hm,
    Vi,
}

impl Locale {
    pub const ALL: [Locale; 8] = [
        Locale::En,
        Locale::La,
        Locale::Ja,
        Locale::Ko,
        Locale::Zh,
        Locale::Th,
        Locale::Hm,
        Locale::Vi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::La => "la",
            Locale::Ja => "ja",
            Locale::Ko => "ko",
            Locale::Zh => "zh",
            Locale::Th => "th",
            Locale::Hm => "hm",
            Locale::Vi => "vi",
        }
    }

    pub fn from_code(code: &str) -> Option<Locale> {
        match code {
            "en" => Some(Locale::En),
            "la" => Some(Locale::La),
            "ja" => Some(Locale::Ja),
            "ko" => Some(Locale::Ko),
            "zh" => Some(Locale::Zh),
            "th" => Some(Locale::Th),
            "hm" => Some(Locale::Hm),
            "vi" => Some(Locale::Vi),
            _ => None,
        }
    }

    pub fn langid(&self) -> LanguageIdentifier {
        self.as_str()
            .parse()
            .expect("locale codes are valid language identifiers")
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::En
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static! {
    pub static ref LOCALES: HashMap<String, FluentResource> = {
        let mut locales = HashMap::new();
        locales.insert(
            "en".to_string(),
            FluentResource::try_new(include_str!("../locales/en.ftl").to_string())
                .expect("English locale file must be valid"),
        );
        locales.insert(
            "la".to_string(),
            FluentResource::try_new(include_str!("../locales/la.ftl").to_string())
                .expect("Lao locale file must be valid"),
        );
        locales.insert(
            "ja".to_string(),
            FluentResource::try_new(include_str!("../locales/ja.ftl").to_string())
                .expect("Japanese locale file must be valid"),
        );
        locales.insert(
            "ko".to_string(),
            FluentResource::try_new(include_str!("../locales/ko.ftl").to_string())
                .expect("Korean locale file must be valid"),
        );
        locales.insert(
            "zh".to_string(),
            FluentResource::try_new(include_str!("../locales/zh.ftl").to_string())
                .expect("Chinese locale file must be valid"),
        );
        locales.insert(
            "th".to_string(),
            FluentResource::try_new(include_str!("../locales/th.ftl").to_string())
                .expect("Thai locale file must be valid"),
        );
        locales.insert(
            "hm".to_string(),
            FluentResource::try_new(include_str!("../locales/hm.ftl").to_string())
                .expect("Hmong locale file must be valid"),
        );
        locales.insert(
            "vi".to_string(),
            FluentResource::try_new(include_str!("../locales/vi.ftl").to_string())
                .expect("Vietnamese locale file must be valid"),
        );
        locales
    };
}

/// Pick a supported locale for a request. A persisted preference wins outright;
/// otherwise the Accept-Language header is negotiated against the supported
/// set. Anything unresolvable maps to `default` rather than erroring.
pub fn negotiate(accept_language: &str, preferred: Option<Locale>, default: Locale) -> Locale {
    if let Some(locale) = preferred {
        return locale;
    }

    let requested = parse_accepted_languages(accept_language);
    let available = convert_vec_str_to_langids_lossy(Locale::ALL.iter().map(|l| l.as_str()));
    let default_id = default.langid();

    let supported = negotiate_languages(
        &requested,
        &available,
        Some(&default_id),
        NegotiationStrategy::Filtering,
    );

    supported
        .first()
        .and_then(|id| Locale::from_code(id.language.as_str()))
        .unwrap_or(default)
}

pub fn bundle_for(locale: Locale) -> FluentBundle<&'static FluentResource, IntlLangMemoizer> {
    let ftl = LOCALES
        .get(locale.as_str())
        .unwrap_or_else(|| LOCALES.get("en").unwrap());

    let mut bundle = FluentBundle::new_concurrent(vec![locale.langid()]);
    bundle.add_resource(ftl).expect("Failed to add a resource.");

    bundle
}

/// Format a message in the given locale. Missing messages fall back to the
/// message id itself, mirroring the template-side lookup.
pub fn message(locale: Locale, message_id: &str) -> String {
    message_with_args(locale, message_id, None)
}

pub fn message_with_args(locale: Locale, message_id: &str, args: Option<&FluentArgs>) -> String {
    let bundle = bundle_for(locale);
    match bundle.get_message(message_id) {
        Some(message) => match message.value() {
            Some(pattern) => bundle.format_pattern(pattern, args, &mut vec![]).to_string(),
            None => message_id.to_string(),
        },
        None => message_id.to_string(),
    }
}
