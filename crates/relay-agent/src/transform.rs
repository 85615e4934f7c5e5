//! Article transformation
//!
//! Builds the rewrite prompt, sends it through a [`TextGenerator`], and splits
//! the reply into title and body on [`SEPARATOR`].

use relay_core::{
    AssetSelection, GeneratorConfig, RelayError, Result, Strictness, TextGenerator,
    TransformedContent,
};
use tracing::{debug, info, warn};

/// Token the generator must place between title and body
pub const SEPARATOR: &str = "|||TITLE-BODY-SEPARATOR|||";

/// Build the rewrite prompt for a source article
pub fn build_prompt(
    config: &GeneratorConfig,
    source_title: &str,
    source_body: &str,
    assets: &AssetSelection,
) -> String {
    let mut image_rules = String::new();
    for (slot, asset) in assets.iter().enumerate() {
        let placement = match slot {
            0 => "right after the introduction".to_string(),
            n if n + 1 == assets.len() => "before the conclusion".to_string(),
            n => format!("after section {}", n + 1),
        };
        image_rules.push_str(&format!(
            "   - Image {}: insert `![image]({})` {}.\n",
            slot + 1,
            asset,
            placement
        ));
    }

    format!(
        "You are a professional health columnist. Rewrite the source article below as an \
original blog post.\n\
\n\
[Requirements]\n\
1. Write entirely in {language}.\n\
2. Audience and tone: {tone}.\n\
3. Use markdown: `##` section headings, short paragraphs, bullet lists where they help.\n\
4. Embed every image below exactly once, as a markdown image:\n\
{image_rules}\
5. The body must be between {min} and {max} characters long.\n\
6. Do not copy sentences from the source; explain the findings in your own words.\n\
\n\
[Output format]\n\
First line: the post title only.\n\
Then a line containing exactly {separator}\n\
Then the markdown body. Output nothing else.\n\
\n\
[Source title]\n\
{title}\n\
\n\
[Source article]\n\
{body}\n",
        language = config.language,
        tone = config.tone,
        image_rules = image_rules,
        min = config.body_min_chars,
        max = config.body_max_chars,
        separator = SEPARATOR,
        title = source_title,
        body = source_body,
    )
}

/// Split a raw reply into `(title, body)` on the first separator
///
/// # Errors
/// * `ResponseFormat` - the separator is absent
/// * `ResponseContent` - title or body is empty after trimming
pub fn parse_response(raw: &str) -> Result<(String, String)> {
    let (title, body) = raw.split_once(SEPARATOR).ok_or_else(|| {
        RelayError::ResponseFormat(format!(
            "expected '{}' in a {}-character reply",
            SEPARATOR,
            raw.chars().count()
        ))
    })?;

    let title = title.trim();
    let body = body.trim();

    if title.is_empty() {
        return Err(RelayError::ResponseContent("title is empty".to_string()));
    }
    if body.is_empty() {
        return Err(RelayError::ResponseContent("body is empty".to_string()));
    }

    Ok((title.to_string(), body.to_string()))
}

/// Asset references the body does not embed, in selection order
pub fn missing_assets<'a>(body: &str, assets: &'a AssetSelection) -> Vec<&'a str> {
    assets.iter().filter(|asset| !body.contains(asset)).collect()
}

/// Check the parts of the output contract that lenient mode trusts the service with
fn enforce_strict(config: &GeneratorConfig, body: &str, assets: &AssetSelection) -> Result<()> {
    let length = body.chars().count();
    if length < config.body_min_chars || length > config.body_max_chars {
        return Err(RelayError::ResponseContent(format!(
            "body is {} characters, expected {}..={}",
            length, config.body_min_chars, config.body_max_chars
        )));
    }

    let missing = missing_assets(body, assets);
    if !missing.is_empty() {
        return Err(RelayError::ResponseContent(format!(
            "body does not embed {}",
            missing.join(", ")
        )));
    }

    Ok(())
}

/// Rewrites source articles through a text generator
pub struct ContentTransformer<G: TextGenerator> {
    generator: G,
    config: GeneratorConfig,
}

impl<G: TextGenerator> ContentTransformer<G> {
    pub fn new(generator: G, config: GeneratorConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Rewrite an article and append the disclaimer
    pub async fn transform(
        &self,
        source_title: &str,
        source_body: &str,
        assets: &AssetSelection,
    ) -> Result<TransformedContent> {
        info!("Transforming article: {}", source_title);

        let prompt = build_prompt(&self.config, source_title, source_body, assets);
        debug!("Prompt is {} characters", prompt.chars().count());

        let raw = self.generator.generate(&prompt).await?;
        let (title, body) = parse_response(&raw)?;

        match self.config.strictness {
            Strictness::Strict => enforce_strict(&self.config, &body, assets)?,
            Strictness::Lenient => {
                let length = body.chars().count();
                if length < self.config.body_min_chars || length > self.config.body_max_chars {
                    warn!("Generated body is {} characters, outside the requested band", length);
                }
                let missing = missing_assets(&body, assets);
                if !missing.is_empty() {
                    warn!("Generated body does not embed {}", missing.join(", "));
                }
            }
        }

        info!("Generated article: {}", title);
        Ok(TransformedContent {
            title,
            body: format!("{}{}", body, self.config.disclaimer),
        })
    }
}
