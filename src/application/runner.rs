use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use dialoguer::Select;
use tokio::sync::mpsc;

use super::renderer::format_artifact;
use super::renderer::Renderer;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Artifact;
use crate::domain::models::BackendBox;
use crate::domain::models::Event;
use crate::domain::models::FieldKind;
use crate::domain::models::FileUpload;
use crate::domain::models::Notice;
use crate::domain::models::ObjectUrlStore;
use crate::domain::models::ShareName;
use crate::domain::models::ToolName;
use crate::domain::models::ToolRequest;
use crate::domain::models::ToolSpec;
use crate::domain::models::Transport;
use crate::domain::services::clipboard::ClipboardService;
use crate::domain::services::clipboard::SystemClipboard;
use crate::domain::services::ActionController;
use crate::domain::services::CreditGate;
use crate::domain::services::Denylist;
use crate::domain::services::Outcome;
use crate::domain::services::ResultPresenter;
use crate::domain::services::Validator;
use crate::infrastructure::backends::remote::RemoteBackend;
use crate::infrastructure::share::ShareManager;

#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub tool: Option<ToolName>,
    pub fields: Vec<String>,
    pub input: Option<PathBuf>,
    pub interactive: bool,
    /// One based panel number to copy.
    pub copy: Option<usize>,
    pub download: bool,
    pub share: bool,
}

fn user_id() -> Result<String> {
    let user_id = Config::get(ConfigKey::ClerkID);
    if user_id.trim().is_empty() {
        bail!("No user id is configured. Pass --clerk-id or set TOOLGATE_CLERK_ID after signing in.");
    }

    return Ok(user_id);
}

async fn backend() -> Result<Arc<BackendBox>> {
    let backend: BackendBox = Box::<RemoteBackend>::default();
    backend.health_check().await?;

    return Ok(Arc::new(backend));
}

async fn denylist() -> Result<Denylist> {
    let denylist_file = Config::get(ConfigKey::DenylistFile);
    if denylist_file.is_empty() {
        return Ok(Denylist::default());
    }

    let denylist = Denylist::with_file(&PathBuf::from(denylist_file)).await?;
    tracing::debug!(terms = denylist.len(), "denylist loaded");

    return Ok(denylist);
}

fn select_tool() -> Result<ToolName> {
    let tools = ToolSpec::all();
    let options = tools
        .iter()
        .map(|spec| return format!("{} ({})", spec.title, spec.name))
        .collect::<Vec<String>>();

    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which tool would you like to run?")
        .default(0)
        .items(&options)
        .interact_opt()?;

    if let Some(idx) = idx {
        return Ok(tools[idx].name);
    }

    bail!("No tool selected");
}

fn prompt_missing_fields(spec: &ToolSpec, request: &mut ToolRequest) -> Result<()> {
    let theme = ColorfulTheme::default();

    for field in spec.fields {
        if request.field(field.name).is_some() {
            continue;
        }

        let value = match field.kind {
            FieldKind::Choice(options) => {
                let default_idx = field
                    .default
                    .and_then(|default| return options.iter().position(|e| return *e == default))
                    .unwrap_or(0);
                let idx = Select::with_theme(&theme)
                    .with_prompt(field.label)
                    .default(default_idx)
                    .items(options)
                    .interact()?;
                options[idx].to_string()
            }
            FieldKind::Text | FieldKind::Number => {
                let mut input = Input::<String>::with_theme(&theme)
                    .with_prompt(field.label)
                    .allow_empty(!field.required);
                if let Some(default) = field.default {
                    input = input.default(default.to_string());
                }
                input.interact_text()?
            }
        };

        request.fields.insert(field.name.to_string(), value);
    }

    return Ok(());
}

async fn present(
    artifact: &Artifact,
    spec: &ToolSpec,
    opts: &RunOptions,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    println!("{}", format_artifact(artifact));

    let share_name =
        ShareName::parse(&Config::get(ConfigKey::ShareTarget)).unwrap_or(ShareName::None);
    let presenter = ResultPresenter::new(
        Box::<SystemClipboard>::default(),
        ShareManager::get(share_name)?,
        PathBuf::from(Config::get(ConfigKey::DownloadDir)),
        tx.clone(),
    );

    if let Some(number) = opts.copy {
        let res = match number.checked_sub(1) {
            Some(idx) => presenter.copy(artifact, spec, idx).await,
            None => Err(anyhow!("Output numbers start at 1")),
        };
        if let Err(err) = res {
            tx.send(Event::Notice(Notice::error(&err.to_string())))?;
        }
    }

    // Binary results only live in memory, so they are always saved.
    let is_binary = matches!(artifact, Artifact::Binary { .. });
    if opts.download || is_binary {
        match presenter.download(artifact, spec).await {
            Ok(path) => println!("{}", path.display()),
            Err(err) => tx.send(Event::Notice(Notice::error(&err.to_string())))?,
        }
    }

    if opts.share {
        if let Err(err) = presenter.share(artifact, spec).await {
            tx.send(Event::Notice(Notice::error(&err.to_string())))?;
        }
    }

    return Ok(());
}

/// Runs one tool end to end. Returns whether it produced a result.
pub async fn run_tool(opts: RunOptions) -> Result<bool> {
    let user_id = user_id()?;
    let name = match opts.tool {
        Some(name) => name,
        None => select_tool()?,
    };
    let spec = ToolSpec::get(name);

    let mut request = ToolRequest::new();
    for arg in opts.fields.iter() {
        request.push_arg(arg)?;
    }
    if let Some(path) = &opts.input {
        request = request.with_file(FileUpload::from_path(path).await?);
    }
    if opts.interactive {
        prompt_missing_fields(spec, &mut request)?;
    }

    let validator = Validator::new(denylist().await?);
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let renderer = tokio::spawn(Renderer::start(rx));

    let mut controller = ActionController::new(
        spec,
        &user_id,
        backend().await?,
        validator,
        ObjectUrlStore::new(),
        tx.clone(),
    );

    let outcome = controller.run(request).await?;
    if outcome == Outcome::Succeeded {
        if let Some(artifact) = controller.result() {
            present(artifact, spec, &opts, &tx).await?;
        }
    }
    controller.reset()?;

    if ClipboardService::pending() > 0 {
        tx.send(Event::Notice(Notice::info(
            "Keeping the clipboard until something else is copied. Press Ctrl+C to quit.",
        )))?;
    }

    drop(controller);
    drop(tx);
    renderer.await??;
    tokio::task::spawn_blocking(ClipboardService::hold).await?;

    return Ok(outcome == Outcome::Succeeded);
}

/// Prints the current balance. Failures read as zero, same as the gate.
pub async fn print_credits() -> Result<bool> {
    let user_id = user_id()?;
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let renderer = tokio::spawn(Renderer::start(rx));

    let gate = CreditGate::new(backend().await?, tx.clone());
    let balance = gate.fetch_credits(&user_id).await?;
    println!("{balance}");

    drop(gate);
    drop(tx);
    renderer.await??;

    return Ok(CreditGate::allows(balance));
}

pub fn tools_text() -> String {
    return ToolSpec::all()
        .iter()
        .map(|spec| {
            let mut lines = vec![format!("- {} ({})", spec.name, spec.title)];
            for field in spec.fields {
                let kind = match field.kind {
                    FieldKind::Text => "text".to_string(),
                    FieldKind::Number => "number".to_string(),
                    FieldKind::Choice(options) => options.join("|"),
                };
                let mut line = format!("    {}: {kind}", field.name);
                if let Some(default) = field.default {
                    line = format!("{line} [default: {default}]");
                }
                lines.push(line);
            }
            if let Transport::Multipart { accept, .. } = spec.transport {
                lines.push(format!("    --input: {}", accept.join(", ")));
            }

            return lines.join("\n");
        })
        .collect::<Vec<String>>()
        .join("\n");
}
