//! # Localization Module
//!
//! Fluent message bundles for German and English, compiled into the binary.
//! Unknown language codes fall back to English, and a key missing from the
//! requested bundle is looked up in English before giving up.

use anyhow::{Context, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::OnceLock;
use unic_langid::LanguageIdentifier;

const FALLBACK_LANGUAGE: &str = "en";

const RESOURCES: &[(&str, &str)] = &[
    ("de", include_str!("../locales/de/main.ftl")),
    ("en", include_str!("../locales/en/main.ftl")),
];

/// Localization manager holding one bundle per supported language
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every bundled language
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();
        for (lang, source) in RESOURCES {
            let locale: LanguageIdentifier = lang
                .parse()
                .with_context(|| format!("Invalid language identifier: {lang}"))?;
            bundles.insert(lang.to_string(), Self::create_bundle(locale, source)?);
        }
        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(locale: LanguageIdentifier, source: &str) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow::anyhow!("Invalid FTL for {locale}: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow::anyhow!("Duplicate messages for {locale}: {errors:?}"))?;

        Ok(bundle)
    }

    /// Whether a bundle exists for the language code
    pub fn is_supported(&self, lang: &str) -> bool {
        let primary = lang.split(['-', '_']).next().unwrap_or_default().to_lowercase();
        self.bundles.contains_key(&primary)
    }

    /// Get a localized message
    pub fn get_message(&self, key: &str, language_code: Option<&str>, args: Option<&FluentArgs>) -> String {
        let lang = normalize_language(language_code.unwrap_or(FALLBACK_LANGUAGE));
        let candidates = [lang.as_str(), FALLBACK_LANGUAGE];

        for candidate in candidates {
            let Some(bundle) = self.bundles.get(candidate) else {
                continue;
            };
            let Some(pattern) = bundle.get_message(key).and_then(|msg| msg.value()) else {
                continue;
            };
            let mut errors = vec![];
            let value = bundle.format_pattern(pattern, args, &mut errors);
            if !errors.is_empty() {
                log::warn!("Formatting errors for {}: {:?}", key, errors);
            }
            return value.into_owned();
        }

        format!("Missing translation: {key}")
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(
        &self,
        key: &str,
        language_code: Option<&str>,
        args: &[(&str, &str)],
    ) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, FluentValue::from(*value));
        }
        self.get_message(key, language_code, Some(&fluent_args))
    }
}

/// "de-AT", "DE_de" and "de" all map to "de"; unknown languages to English
fn normalize_language(lang: &str) -> String {
    let primary = lang
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    if RESOURCES.iter().any(|(code, _)| *code == primary) {
        primary
    } else {
        FALLBACK_LANGUAGE.to_string()
    }
}

/// Global localization instance
static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Initialize the global localization manager
pub fn init_localization() -> Result<()> {
    if LOCALIZATION_MANAGER.get().is_none() {
        let manager = LocalizationManager::new()?;
        let _ = LOCALIZATION_MANAGER.set(manager);
    }
    Ok(())
}

/// Get the global localization manager, initializing it on first use
pub fn get_localization_manager() -> &'static LocalizationManager {
    LOCALIZATION_MANAGER.get_or_init(|| {
        LocalizationManager::new().expect("Bundled locale files should be valid")
    })
}

/// Convenience function to get a localized message
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    get_localization_manager().get_message(key, language_code, None)
}

/// Convenience function to get a localized message with arguments
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    get_localization_manager().get_message_with_args(key, language_code, args)
}

/// Whether the language writes decimals with a comma ("1,5")
pub fn uses_decimal_comma(language_code: Option<&str>) -> bool {
    language_code.is_some_and(|lang| normalize_language(lang) == "de")
}
