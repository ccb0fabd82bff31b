//! Subcommand implementations

use crate::args::{Commands, FallbackArg};
use crate::recent::{self, RecentTemplate};
use anyhow::{Context, Result, bail};
use comfy_table::{Table, presets::UTF8_FULL};
use prompt_engine::{
    ExportFormat, ExportOptions, ParseResult, PromptDefinition, RenderOptions, RenderResult,
    SecurityRisk,
};
use prompt_cache::LruStore;
use prompt_utils::Config;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit status for templates with syntax errors
const EXIT_INVALID: u8 = 1;
/// Exit status for a strict render with missing values
const EXIT_STRICT: u8 = 2;

pub fn run(command: Commands, config: &Config) -> Result<ExitCode> {
    match command {
        Commands::Parse { file, json } => parse(&file, json, config),
        Commands::Render {
            file,
            data,
            fallback,
            defaults,
            strict,
            json,
        } => render(
            &file,
            &RenderArgs {
                data,
                fallback,
                defaults,
                strict,
                json,
            },
            config,
        ),
        Commands::Highlight { file } => {
            println!("{}", prompt_engine::highlight(&read_template(&file)?));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Export {
            definition,
            format,
            out,
            compact,
        } => export(&definition, format, out.as_deref(), compact),
        Commands::PreviewLink {
            definition,
            base_url,
        } => {
            let definition = read_definition(&definition)?;
            let link = prompt_engine::generate_preview_link(&definition, &base_url)
                .context("Failed to build preview link")?;
            println!("{link}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::DecodeLink { link } => {
            let definition =
                prompt_engine::parse_preview_link(&link).context("Failed to decode preview link")?;
            println!("{}", serde_json::to_string_pretty(&definition)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Recent { clear } => recent_templates(clear, config),
    }
}

fn parse(file: &Path, json: bool, config: &Config) -> Result<ExitCode> {
    let template = read_template(file)?;
    let result = prompt_engine::parse(&template);
    recent::record(config, file, "parse", result.variables.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_parse_result(&result);
    }

    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INVALID)
    })
}

struct RenderArgs {
    data: Option<PathBuf>,
    fallback: FallbackArg,
    defaults: Option<PathBuf>,
    strict: bool,
    json: bool,
}

fn render(file: &Path, args: &RenderArgs, config: &Config) -> Result<ExitCode> {
    let template = read_template(file)?;
    let data = match &args.data {
        Some(path) => read_json_object(path)?,
        None => Map::new(),
    };

    let mut options = RenderOptions::new()
        .fallback(args.fallback.into())
        .strict(args.strict);
    if let Some(path) = &args.defaults {
        options.default_values = read_json_object(path)?;
    }

    let risks = prompt_engine::scan_security_risks(&data);
    let result =
        prompt_engine::render(&template, &data, &options).context("Failed to render template")?;
    recent::record(
        config,
        file,
        "render",
        result.replaced.len() + result.missing.len(),
    );

    if args.json {
        let risks: Vec<String> = risks.iter().map(SecurityRisk::message).collect();
        let output = json!({ "result": result, "securityRisks": risks });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", result.text);
        print_render_summary(&result, &risks);
    }

    if result.strict_violation() {
        eprintln!(
            "strict mode: missing values for {}",
            result.missing.join(", ")
        );
        return Ok(ExitCode::from(EXIT_STRICT));
    }
    Ok(ExitCode::SUCCESS)
}

fn export(
    path: &Path,
    format: ExportFormat,
    out: Option<&Path>,
    compact: bool,
) -> Result<ExitCode> {
    let definition = read_definition(path)?;
    let exported = prompt_engine::export_prompt(
        &definition,
        &ExportOptions::new(format).pretty(!compact),
    )
    .with_context(|| format!("Failed to export as {format}"))?;

    match out {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let target = dir.join(&exported.filename);
            fs::write(&target, &exported.content)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            tracing::info!(path = %target.display(), mime = %exported.mime_type, "Exported prompt");
            eprintln!("Wrote {}", target.display());
        }
        None => println!("{}", exported.content),
    }
    Ok(ExitCode::SUCCESS)
}

fn recent_templates(clear: bool, config: &Config) -> Result<ExitCode> {
    let mut store = recent::open(config)?;

    if clear {
        store.clear();
        println!("Cleared recent templates");
        return Ok(ExitCode::SUCCESS);
    }

    let entries = store.get_all();
    if entries.is_empty() {
        println!("No recent templates");
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Template", "Last action", "Variables", "Used at"]);
    for (path, entry) in entries {
        table.add_row(vec![
            path,
            entry.action,
            entry.variables.to_string(),
            entry.touched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ]);
    }
    println!("{table}");
    println!("{}", capacity_line(&store));
    Ok(ExitCode::SUCCESS)
}

fn capacity_line(store: &LruStore<RecentTemplate>) -> String {
    let config = store.config();
    match config.ttl {
        Some(ttl) => format!(
            "{} of {} entries, kept for {}s",
            store.size(),
            config.max_size,
            ttl.as_secs()
        ),
        None => format!("{} of {} entries", store.size(), config.max_size),
    }
}

fn print_parse_result(result: &ParseResult) {
    if result.variables.is_empty() {
        println!("No variables");
    } else {
        println!("{}", variables_table(result));
    }

    for error in &result.errors {
        println!(
            "error[{}] {}..{}: {}",
            error.kind,
            error.span.start,
            error.span.end,
            error.message
        );
    }
    for warning in &result.warnings {
        match &warning.suggestion {
            Some(suggestion) => println!("warning: {} ({suggestion})", warning.message),
            None => println!("warning: {}", warning.message),
        }
    }
}

fn variables_table(result: &ParseResult) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Variable", "Type", "Required", "Inferred", "Default"]);
    for variable in &result.variables {
        table.add_row(vec![
            variable.name.clone(),
            variable.var_type.to_string(),
            yes_no(variable.required).to_string(),
            yes_no(variable.inferred).to_string(),
            variable
                .default_value
                .as_ref()
                .map_or_else(|| "-".to_string(), Value::to_string),
        ]);
    }
    table
}

fn print_render_summary(result: &RenderResult, risks: &[SecurityRisk]) {
    eprintln!("tokens: ~{}", result.token_estimate);
    if !result.missing.is_empty() {
        eprintln!("missing: {}", result.missing.join(", "));
    }
    for risk in risks {
        eprintln!("warning: {}", risk.message());
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read template {}", path.display()))
}

fn read_json_object(path: &Path) -> Result<Map<String, Value>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

fn read_definition(path: &Path) -> Result<PromptDefinition> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    prompt_engine::import_from_json(&contents)
        .with_context(|| format!("{} is not a prompt definition", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_engine::parse;

    #[test]
    fn test_read_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        fs::write(&path, r#"{ "name": "Ada" }"#).unwrap();
        assert_eq!(read_json_object(&path).unwrap()["name"], "Ada");

        fs::write(&path, "[1, 2]").unwrap();
        let err = read_json_object(&path).unwrap_err();
        assert!(err.to_string().contains("must contain a JSON object"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let definition = dir.path().join("prompt.json");
        fs::write(
            &definition,
            r#"{ "name": "Greeting", "key": "greet@v1", "templateContent": "Hi {{name}}" }"#,
        )
        .unwrap();

        let out = dir.path().join("out");
        export(&definition, ExportFormat::Markdown, Some(&out), false).unwrap();

        let written = fs::read_to_string(out.join("greet_v1.md")).unwrap();
        assert!(written.starts_with("# Greeting"));
    }

    #[test]
    fn test_variables_table() {
        let table = variables_table(&parse("{{imageUrl}} {{count}}")).to_string();
        assert!(table.contains("imageUrl"));
        assert!(table.contains("image_url"));
        assert!(table.contains("number"));
    }

    #[test]
    fn test_capacity_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.cache.storage_dir = Some(dir.path().to_path_buf());
        config.cache.max_size = 3;
        config.cache.ttl_secs = Some(60);

        let mut store = recent::open(&config).unwrap();
        assert_eq!(capacity_line(&store), "0 of 3 entries, kept for 60s");

        store.set(
            "a.txt".to_string(),
            RecentTemplate {
                action: "parse".to_string(),
                variables: 1,
                touched_at: chrono::Utc::now(),
            },
        );
        config.cache.ttl_secs = None;
        let store = recent::open(&config).unwrap();
        assert_eq!(capacity_line(&store), "1 of 3 entries");
    }

    #[test]
    fn test_strict_render_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("t.txt");
        fs::write(&template, "Hello {{name}}").unwrap();

        let mut config = Config::default();
        config.cache.storage_dir = None;
        let args = RenderArgs {
            data: None,
            fallback: FallbackArg::Keep,
            defaults: None,
            strict: true,
            json: false,
        };

        let code = render(&template, &args, &config).unwrap();
        assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::from(EXIT_STRICT)));
    }
}
