use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
/// Credentials are read from the environment (or `.env`) only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub generation: Option<GenerationSection>,
    pub pdf: Option<PdfSection>,
    pub output: Option<OutputSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationSection {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub project: Option<String>,
    pub base_url: Option<String>,
    pub max_completion_tokens: Option<u32>,
    pub force_mock: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfSection {
    /// Fraction of page height from the top to drop as running header.
    pub header_exclusion: Option<f32>,
    /// Fraction of page height from the bottom to drop as footer.
    pub footer_exclusion: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    pub out_dir: Option<String>,
}

/// Platform config directory path: `<config_dir>/abstractor/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("abstractor").join("config.toml"))
}

/// Load config by cascading CWD `.abstractor.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".abstractor.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

fn pick<S, T>(
    overlay: &Option<S>,
    base: &Option<S>,
    field: impl Fn(&S) -> Option<T>,
) -> Option<T> {
    overlay
        .as_ref()
        .and_then(&field)
        .or_else(|| base.as_ref().and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (bg, og) = (&base.generation, &overlay.generation);
    let (bp, op) = (&base.pdf, &overlay.pdf);
    let (bo, oo) = (&base.output, &overlay.output);
    ConfigFile {
        generation: Some(GenerationSection {
            model: pick(og, bg, |g| g.model.clone()),
            temperature: pick(og, bg, |g| g.temperature),
            project: pick(og, bg, |g| g.project.clone()),
            base_url: pick(og, bg, |g| g.base_url.clone()),
            max_completion_tokens: pick(og, bg, |g| g.max_completion_tokens),
            force_mock: pick(og, bg, |g| g.force_mock),
        }),
        pdf: Some(PdfSection {
            header_exclusion: pick(op, bp, |p| p.header_exclusion),
            footer_exclusion: pick(op, bp, |p| p.footer_exclusion),
        }),
        output: Some(OutputSection {
            out_dir: pick(oo, bo, |o| o.out_dir.clone()),
        }),
    }
}
