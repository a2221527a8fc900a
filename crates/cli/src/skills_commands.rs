//! CLI commands for syncing skills into a target's directory.

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use {
    anyhow::Context,
    clap::Args,
    skillsync_config::SkillsyncConfig,
    skillsync_skills::{
        BatchKind, BatchReport, Catalog, Error, InstallMode, ItemStatus, RemoveOutcome,
        Resolution, SyncEnv,
    },
};

const RULE: &str = "============================================================";

/// A single skill name or `--all`, never both.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct Selection {
    /// Name of the skill.
    pub skill: Option<String>,
    /// Apply to ALL skills.
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Args)]
pub struct DestinationArgs {
    /// Target tool: opencode or antigravity.
    #[arg(long, env = "SKILLSYNC_TARGET")]
    pub target: String,
    /// Scope: global or workspace. Open Code only supports global.
    #[arg(long)]
    pub scope: Option<String>,
}

/// Everything a command needs besides its own arguments.
pub struct SyncContext {
    config: SkillsyncConfig,
    source_override: Option<PathBuf>,
    cwd: PathBuf,
    /// Only needed once a destination is resolved.
    home: Option<PathBuf>,
}

impl SyncContext {
    pub fn new(config: SkillsyncConfig, source_override: Option<PathBuf>) -> anyhow::Result<Self> {
        Ok(Self {
            config,
            source_override,
            cwd: std::env::current_dir().context("failed to read the working directory")?,
            home: skillsync_config::home_dir(),
        })
    }

    fn env(&self) -> anyhow::Result<SyncEnv> {
        let home = self.home.clone().ok_or(Error::HomeDirUnavailable)?;
        Ok(SyncEnv::new(home, self.cwd.clone()))
    }

    fn source_root(&self) -> PathBuf {
        let dir = self
            .source_override
            .as_ref()
            .unwrap_or(&self.config.source_dir);
        if dir.is_absolute() {
            dir.clone()
        } else {
            self.cwd.join(dir)
        }
    }

    fn catalog(&self) -> anyhow::Result<Catalog> {
        Ok(Catalog::open(self.source_root())?.with_excludes(self.config.exclude.iter().cloned()))
    }

    fn resolve(&self, dest: &DestinationArgs) -> anyhow::Result<Resolution> {
        let scope = dest.scope.as_deref().unwrap_or(&self.config.default_scope);
        Ok(skillsync_skills::resolve_named(
            &dest.target,
            scope,
            &self.env()?,
        )?)
    }

    fn install_mode(&self, staged_flag: bool) -> InstallMode {
        if staged_flag || self.config.install.staged {
            InstallMode::Staged
        } else {
            InstallMode::Replace
        }
    }
}

pub fn handle_install(
    ctx: &SyncContext,
    selection: Selection,
    dest: &DestinationArgs,
    staged: bool,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let res = ctx.resolve(dest)?;
    let catalog = ctx.catalog()?;
    let mode = ctx.install_mode(staged);

    if !json {
        print_header(&res, Some(catalog.root()));
    }

    if selection.all {
        let report = skillsync_skills::install_all(&catalog, &res.root, mode)?;
        if !json {
            println!("Found {} skills to install.", report.total());
        }
        return finish_batch(&res, &report, json);
    }

    let Some(name) = selection.skill else {
        anyhow::bail!("please specify a skill name or use --all");
    };
    if !json {
        println!("Installing '{name}'...");
    }
    let outcome = skillsync_skills::install_skill(&catalog, &name, &res.root, mode)
        .map_err(|e| anyhow::anyhow!("failed to install '{name}': {e}"))?;

    if json {
        print_json(serde_json::json!({
            "resolution": res,
            "mode": mode,
            "outcome": outcome,
        }))?;
    } else {
        if outcome.replaced {
            println!("  replaced existing installation");
        }
        println!("  ✓ installed to {}", outcome.destination.display());
        println!("{RULE}");
        println!("Done. Installed 1/1 skills.");
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_list(
    ctx: &SyncContext,
    dest: &DestinationArgs,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let res = ctx.resolve(dest)?;
    let skills = skillsync_skills::list_installed(&res.root)?;

    if json {
        print_json(serde_json::json!({
            "resolution": res,
            "skills": skills,
        }))?;
        return Ok(ExitCode::SUCCESS);
    }

    print_header(&res, None);
    if !res.root.exists() {
        println!("No skills installed yet (destination directory does not exist).");
    } else if skills.is_empty() {
        println!("No skills installed.");
    } else {
        println!("Installed Skills ({}):", skills.len());
        for skill in &skills {
            println!("  - {skill}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_remove(
    ctx: &SyncContext,
    selection: Selection,
    dest: &DestinationArgs,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let res = ctx.resolve(dest)?;
    if !json {
        print_header(&res, None);
    }

    if selection.all {
        let report = skillsync_skills::remove_all(&res.root)?;
        if !json {
            if report.total() == 0 {
                println!("No skills to remove.");
                return Ok(ExitCode::SUCCESS);
            }
            println!("Found {} skills to remove.", report.total());
        }
        return finish_batch(&res, &report, json);
    }

    let Some(name) = selection.skill else {
        anyhow::bail!("please specify a skill name or use --all");
    };
    let outcome = skillsync_skills::remove_skill(&name, &res.root)
        .map_err(|e| anyhow::anyhow!("failed to remove '{name}': {e}"))?;

    if json {
        print_json(serde_json::json!({
            "resolution": res,
            "outcome": outcome,
        }))?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("Removing '{name}'...");
    match outcome {
        RemoveOutcome::Removed(path) => {
            println!("  ✓ removed {}", path.display());
            println!("{RULE}");
            println!("Done. Removed 1/1 skills.");
        },
        RemoveOutcome::NotInstalled(path) => {
            println!(
                "  '{name}' is not installed (path {} not found), nothing to do.",
                path.display()
            );
        },
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_available(ctx: &SyncContext, json: bool) -> anyhow::Result<ExitCode> {
    let catalog = ctx.catalog()?;
    let skills = catalog.skills()?;

    if json {
        print_json(serde_json::json!({
            "source": catalog.root(),
            "skills": skills,
        }))?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("Source: {}", catalog.root().display());
    if skills.is_empty() {
        println!("No skills found.");
    } else {
        println!("Available Skills ({}):", skills.len());
        for skill in &skills {
            println!("  - {}", skill.name);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_header(res: &Resolution, source: Option<&Path>) {
    println!("{RULE}");
    println!("Target:      {}", res.target.as_str().to_uppercase());
    if let Some(source) = source {
        println!("Source:      {}", source.display());
    }
    println!("Destination: {}", res.root.display());
    if res.coerced() {
        println!(
            "Scope:       {} ({} does not support {} scope)",
            res.scope.as_str().to_uppercase(),
            res.target.display_name(),
            res.requested_scope
        );
    } else {
        println!("Scope:       {}", res.scope.as_str().to_uppercase());
    }
    println!("{RULE}");
}

fn finish_batch(res: &Resolution, report: &BatchReport, json: bool) -> anyhow::Result<ExitCode> {
    if json {
        print_json(serde_json::json!({
            "resolution": res,
            "status": report.status(),
            "succeeded": report.succeeded(),
            "failed": report.failed(),
            "report": report,
        }))?;
    } else {
        for item in &report.items {
            let detail = match (item.status, &item.error, &item.path) {
                (ItemStatus::Failed, Some(err), _) => format!("✗ {err}"),
                (ItemStatus::NotInstalled, _, _) => "not installed, skipped".to_string(),
                (ItemStatus::Replaced, _, Some(path)) => {
                    format!("✓ replaced {}", path.display())
                },
                (_, _, Some(path)) => format!("✓ {}", path.display()),
                (status, ..) => format!("{status:?}"),
            };
            println!("  {}: {detail}", item.name);
        }

        let verb = match report.kind {
            BatchKind::Install => "Installed",
            BatchKind::Remove => "Removed",
        };
        println!("{RULE}");
        println!(
            "Done. {verb} {}/{} skills.",
            report.succeeded(),
            report.total()
        );
    }

    Ok(ExitCode::from(batch_exit_code(report)))
}

/// Non-zero when any item in the batch failed, even if others succeeded.
fn batch_exit_code(report: &BatchReport) -> u8 {
    u8::from(report.has_failures())
}

fn print_json(value: serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn context(tmp: &Path, source_override: Option<PathBuf>) -> SyncContext {
        SyncContext {
            config: SkillsyncConfig::default(),
            source_override,
            cwd: tmp.join("repo"),
            home: Some(tmp.join("home")),
        }
    }

    fn dest(target: &str, scope: Option<&str>) -> DestinationArgs {
        DestinationArgs {
            target: target.to_string(),
            scope: scope.map(str::to_string),
        }
    }

    #[test]
    fn relative_source_is_anchored_at_cwd() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path(), None);
        assert_eq!(ctx.source_root(), tmp.path().join("repo/skills"));

        let ctx = context(tmp.path(), Some(PathBuf::from("/opt/skills")));
        assert_eq!(ctx.source_root(), PathBuf::from("/opt/skills"));
    }

    #[test]
    fn scope_defaults_to_config() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ctx = context(tmp.path(), None);
        ctx.config.default_scope = "workspace".into();

        let res = ctx.resolve(&dest("antigravity", None)).unwrap();
        assert_eq!(res.root, tmp.path().join("repo/.agent/skills"));
    }

    #[test]
    fn unknown_target_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path(), None);
        let err = ctx.resolve(&dest("cursor", None)).unwrap_err();
        assert!(err.to_string().contains("unknown target 'cursor'"));
    }

    #[test]
    fn available_works_without_home_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("repo/skills/pdf");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("SKILL.md"), "---\nname: pdf\n---\n").unwrap();

        let mut ctx = context(tmp.path(), None);
        ctx.home = None;

        assert!(handle_available(&ctx, true).is_ok());
        let err = ctx.resolve(&dest("opencode", None)).unwrap_err();
        assert!(err.to_string().contains("home directory"));
    }

    #[test]
    fn staged_flag_or_config_selects_staged_mode() {
        let tmp = tempfile::tempdir().unwrap();
        let mut ctx = context(tmp.path(), None);
        assert_eq!(ctx.install_mode(false), InstallMode::Replace);
        assert_eq!(ctx.install_mode(true), InstallMode::Staged);
        ctx.config.install.staged = true;
        assert_eq!(ctx.install_mode(false), InstallMode::Staged);
    }

    #[test]
    fn batch_with_failure_exits_nonzero() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("repo/skills/pdf");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("SKILL.md"), "---\nname: pdf\n---\n").unwrap();

        let ctx = context(tmp.path(), None);
        let res = ctx.resolve(&dest("opencode", None)).unwrap();
        let catalog = ctx.catalog().unwrap();
        let report = skillsync_skills::install_many(
            &catalog,
            &["pdf", "ghost"],
            &res.root,
            InstallMode::Replace,
        );

        assert_eq!(batch_exit_code(&report), 1);
        assert!(res.root.join("pdf/SKILL.md").is_file());

        let report =
            skillsync_skills::install_many(&catalog, &["pdf"], &res.root, InstallMode::Replace);
        assert_eq!(batch_exit_code(&report), 0);
    }
}
