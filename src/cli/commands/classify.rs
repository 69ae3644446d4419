//! Classify Command
//!
//! Show how a prompt would be routed without calling any provider.

use serde_json::json;

use crate::cli::{Output, is_json};
use crate::config::Config;
use crate::router::{Classifier, SkipDirective};
use crate::types::{ComplexityTier, Prompt, Result};

pub fn run(config: &Config, prompt: &str, format: &str) -> Result<()> {
    let prompt = Prompt::new(prompt);
    let classification = Classifier::new(&config.classifier).classify(&prompt);
    let directive = SkipDirective::new(&config.enhancer.skip_directive)?;

    let tier_config = config.tiers.get(classification.tier);
    let skip_directive = directive.is_present(prompt.text());
    let would_enhance =
        classification.tier == ComplexityTier::High && config.enhancer.enabled && !skip_directive;

    if is_json(format) {
        let report = json!({
            "classification": classification,
            "chars": prompt.char_count(),
            "provider": tier_config.provider,
            "candidates": tier_config.models,
            "timeout_secs": tier_config.timeout_secs,
            "skip_directive": skip_directive,
            "would_enhance": would_enhance,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let output = Output::new();
    output.section("Classification");
    output.classification(&classification);
    output.field("Chars", prompt.char_count());

    output.section("Dispatch");
    output.field("Provider", &tier_config.provider);
    output.field("Timeout", format!("{}s", tier_config.timeout_secs));
    for (i, model) in tier_config.models.iter().enumerate() {
        output.field(&format!("#{}", i + 1), model);
    }
    output.field("Enhance", if would_enhance { "yes" } else { "no" });
    if skip_directive {
        output.info("Skip directive present; it will be stripped before dispatch");
    }

    Ok(())
}
