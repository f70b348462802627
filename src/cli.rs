// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::auth::inspect_token;
use crate::brief_data::BriefData;
use crate::client::BriefClient;
use crate::core::database::NewBrief;
use crate::core::{ConfigManager, Database, FsOps};
use crate::hunter::{HunterClient, DEFAULT_POLL_INTERVAL};
use crate::preferences::{Language, Seniority, UserPreferences};
use crate::section::{FieldKind, Section};
use crate::session::SessionId;
use crate::types::request::SearchRequest;
use crate::wizard::BriefWizard;

#[derive(Parser)]
#[command(name = "briefgen")]
#[command(about = "Build job briefs section by section with the brief generation backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Override the brief backend base URL
    #[arg(long, global = true)]
    pub brief_api_url: Option<String>,

    /// Override the local brief archive location
    #[arg(long, global = true)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the 18 brief sections with their identifiers and fields
    Sections,
    /// Run the whole wizard from a TOML file of section answers
    New {
        /// TOML file, one table per section (slug or label)
        input: PathBuf,
        #[arg(long, default_value = "fr")]
        language: String,
        #[arg(long, default_value = "Senior")]
        seniority: String,
        /// Sections to include; defaults to the sections present in the input
        #[arg(long = "section")]
        sections: Vec<String>,
        /// Revision request applied after generation, as section=feedback
        #[arg(long)]
        feedback: Vec<String>,
        /// Write the final brief to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Do not keep a copy in the local archive
        #[arg(long)]
        no_archive: bool,
    },
    /// Fetch the assembled brief of an existing session
    Fetch {
        #[arg(long)]
        session: String,
    },
    /// Show the data stored by the backend for one section of a session
    SectionData {
        #[arg(long)]
        session: String,
        #[arg(long)]
        section: String,
    },
    /// List archived briefs
    History {
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
    /// Print an archived brief
    Show { session: String },
    /// Source candidates for a brief through the hunter service
    Hunt {
        #[arg(long)]
        user: String,
        /// Brief text used as search criteria
        #[arg(long)]
        text: String,
        #[arg(long, default_value_t = 40)]
        max_polls: u32,
    },
}

impl Cli {
    /// Apply the global flags on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut ConfigManager) {
        if let Some(url) = &self.brief_api_url {
            config.service.brief_api_url = url.clone();
        }
        if let Some(path) = &self.database_path {
            config.environment.database_path = path.clone();
        }
    }
}

impl Command {
    /// Whether the command reads or writes the local brief archive
    pub fn uses_archive(&self) -> bool {
        match self {
            Command::New { no_archive, .. } => !no_archive,
            Command::History { .. } | Command::Show { .. } => true,
            Command::Sections
            | Command::Fetch { .. }
            | Command::SectionData { .. }
            | Command::Hunt { .. } => false,
        }
    }
}

/// Run `command` against a configuration that already carries the CLI
/// overrides
pub async fn handle_command(command: Command, config: ConfigManager) -> Result<()> {
    match command {
        Command::Sections => {
            list_sections();
            Ok(())
        }

        Command::New {
            input,
            language,
            seniority,
            sections,
            feedback,
            output,
            no_archive,
        } => {
            let options = NewBriefOptions {
                input,
                language: language.parse()?,
                seniority: seniority.parse()?,
                sections: sections
                    .iter()
                    .map(|s| s.parse::<Section>())
                    .collect::<Result<Vec<_>, _>>()?,
                feedback: parse_feedback(&feedback)?,
                output,
                archive: !no_archive,
            };
            run_new_brief(&config, options).await
        }

        Command::Fetch { session } => {
            let session_id: SessionId = session.parse().context("Invalid session id")?;
            let client = BriefClient::with_session(config.brief_service_client()?, session_id);
            let markdown = client.fetch_final_document().await?;
            println!("{}", markdown);
            Ok(())
        }

        Command::SectionData { session, section } => {
            let session_id: SessionId = session.parse().context("Invalid session id")?;
            let section: Section = section.parse()?;
            let client = BriefClient::with_session(config.brief_service_client()?, session_id);

            match client.fetch_section_data(section).await {
                Some(data) => println!("{}", serde_json::to_string_pretty(&data)?),
                None => info!("No stored data for {} in session {}", section, session_id),
            }
            Ok(())
        }

        Command::History { limit } => {
            let db = Database::new(&config.environment.database_path).await?;
            let briefs = db.briefs().list(limit).await?;

            if briefs.is_empty() {
                info!("No archived briefs.");
                return Ok(());
            }

            println!("{:<38} {:<17} {:<4} {:<10} {}", "Session", "Created", "Lang", "Seniority", "Title");
            println!("{}", "-".repeat(100));
            for brief in briefs {
                println!(
                    "{:<38} {:<17} {:<4} {:<10} {}",
                    brief.session_id,
                    brief.created_at.format("%Y-%m-%d %H:%M"),
                    brief.language,
                    brief.seniority,
                    brief.title.as_deref().unwrap_or("(untitled)")
                );
            }
            Ok(())
        }

        Command::Show { session } => {
            let db = Database::new(&config.environment.database_path).await?;
            match db.briefs().find_by_session(session.trim()).await? {
                Some(brief) => println!("{}", brief.markdown),
                None => anyhow::bail!("No archived brief for session {}", session),
            }
            Ok(())
        }

        Command::Hunt {
            user,
            text,
            max_polls,
        } => {
            if let Some(token) = &config.service.hunter_api_token {
                match inspect_token(token) {
                    Ok(claims) if claims.is_expired() => {
                        warn!("HUNTER_API_TOKEN expired, the hunter service will reject it")
                    }
                    Ok(claims) => info!(
                        "Calling hunter service as {}",
                        claims.email.or(claims.sub).unwrap_or_else(|| "unknown".to_string())
                    ),
                    Err(e) => warn!("Could not read HUNTER_API_TOKEN claims: {}", e),
                }
            }

            let hunter = HunterClient::new(config.hunter_service_client()?);
            let request = SearchRequest::new(user, text);
            let candidates = hunter
                .search_and_wait(&request, DEFAULT_POLL_INTERVAL, max_polls)
                .await?;

            if candidates.is_empty() {
                info!("No candidates found.");
            }
            for candidate in candidates {
                println!(
                    "{:>5.1}  {:<30} {:<12} {}",
                    candidate.match_score, candidate.name, candidate.source, candidate.profile_url
                );
            }
            Ok(())
        }
    }
}

pub struct NewBriefOptions {
    pub input: PathBuf,
    pub language: Language,
    pub seniority: Seniority,
    pub sections: Vec<Section>,
    pub feedback: HashMap<Section, String>,
    pub output: Option<PathBuf>,
    pub archive: bool,
}

/// Drive the wizard end to end: configure, enter data, generate, revise,
/// approve, preview, then store the final document.
pub async fn run_new_brief(config: &ConfigManager, options: NewBriefOptions) -> Result<()> {
    let content = FsOps::read_file_safe(&options.input).await?;
    let data = BriefData::from_toml_str(&content)?;

    let sections = if options.sections.is_empty() {
        data.sections().map(|(section, _)| section).collect::<Vec<_>>()
    } else {
        options.sections.clone()
    };
    if sections.is_empty() {
        anyhow::bail!("No sections selected and none found in {}", options.input.display());
    }

    let preferences =
        UserPreferences::new(options.language, options.seniority).with_sections(sections);

    let client = BriefClient::new(config.brief_service_client()?);
    info!("Brief session: {}", client.session_id());

    let mut wizard = BriefWizard::new(preferences);
    wizard
        .complete_configuration(&client)
        .await
        .context("Failed to save brief configuration")?;

    let enabled = wizard.preferences().enabled_sections();

    for &section in &enabled {
        let Some(fields) = data.section(section) else {
            warn!("No data provided for {}", section);
            continue;
        };
        wizard
            .enter_section_data(&client, section, fields.clone())
            .await
            .with_context(|| format!("Failed to save data for {}", section))?;
    }
    wizard.complete_data_entry()?;

    for &section in &enabled {
        let draft = wizard
            .generate(&client, section)
            .await
            .with_context(|| format!("Failed to generate {}", section))?;
        info!(
            "{}: confidence {:.0}% ({})",
            section,
            draft.confidence * 100.0,
            draft.confidence_level()
        );
        if draft.fallback_needed {
            warn!("{}: the backend suggests reviewing this section", section);
        }

        if let Some(feedback) = options.feedback.get(&section) {
            wizard
                .revise(&client, section, feedback)
                .await
                .with_context(|| format!("Failed to revise {}", section))?;
        }

        wizard
            .approve(&client, section)
            .await
            .with_context(|| format!("Failed to approve {}", section))?;
        info!("Progress: {:.0}%", wizard.progress());
    }

    wizard.complete_generation()?;
    let markdown = wizard.final_document(&client).await?;

    match &options.output {
        Some(path) => FsOps::write_file_safe(path, &markdown).await?,
        None => println!("{}", markdown),
    }

    if options.archive {
        let brief = NewBrief {
            session_id: client.session_id(),
            title: wizard.brief_data().job_title().map(str::to_string),
            language: wizard.preferences().language.to_string(),
            seniority: wizard.preferences().seniority.to_string(),
            sections: enabled.iter().map(|s| s.slug().to_string()).collect(),
            markdown,
        };

        match Database::new(&config.environment.database_path).await {
            Ok(db) => {
                db.briefs().save(&brief).await?;
            }
            Err(e) => error!("Brief not archived: {}", e),
        }
    }

    Ok(())
}

fn parse_feedback(entries: &[String]) -> Result<HashMap<Section, String>> {
    entries
        .iter()
        .map(|entry| {
            let (section, text) = entry
                .split_once('=')
                .with_context(|| format!("Feedback must look like section=text, got: {}", entry))?;
            Ok((section.parse::<Section>()?, text.trim().to_string()))
        })
        .collect()
}

fn list_sections() {
    println!("{:<3} {:<28} {:<36} {}", "#", "Identifier", "Label", "Fields");
    println!("{}", "-".repeat(110));
    for section in Section::ALL {
        let fields = section
            .fields()
            .iter()
            .map(|f| {
                let mut name = f.name.to_string();
                if f.required {
                    name.push('*');
                }
                if let FieldKind::Select(options) = f.kind {
                    name.push_str(&format!(" [{}]", options.join("|")));
                }
                name
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<3} {:<28} {:<36} {}",
            section.index() + 1,
            section.slug(),
            section.label(),
            fields
        );
    }
}
