//! Subcommand handlers. Each one stands in for an admin dashboard view.

use std::io::{BufRead, Write};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::auth::{AuthSession, GuardState, Navigator};
use crate::cli::{CliError, Command, Resource, ThemeCommand};
use crate::config::ClientConfig;
use crate::crud::{CrudController, Entity, filter_by_category, paginate};
use crate::entities::{
    AboutRecord, BlogPost, ContactMessage, Product, ProductAccessRequest, Project, Skill,
    ThemeController, ThemeSettings,
};
use crate::jwt;

/// Records where the guard wanted to send us.
#[derive(Debug, Default)]
struct Redirect(Option<String>);

impl Navigator for Redirect {
    fn replace(&mut self, path: &str) {
        self.0 = Some(path.to_string());
    }
}

/// Collection operations. The mutating ones need an admin session.
#[derive(Debug, Clone)]
enum ResourceOp<'a> {
    List {
        page: usize,
        per_page: usize,
        category: Option<&'a str>,
    },
    Show(&'a str),
    Create(&'a str),
    Update(&'a str, &'a str),
    Delete(&'a str, bool),
}

impl ResourceOp<'_> {
    fn mutates(&self) -> bool {
        matches!(self, Self::Create(_) | Self::Update(..) | Self::Delete(..))
    }
}

pub async fn run(
    command: &Command,
    config: &ClientConfig,
    session: &AuthSession,
) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            session.login(email, password).await?;
            print_json(&status_json(session))
        }
        Command::Logout => {
            session.logout();
            info!("Logged out");
            Ok(())
        }
        Command::Status => print_json(&status_json(session)),
        Command::List {
            resource,
            page,
            per_page,
            category,
        } => {
            let op = ResourceOp::List {
                page: *page,
                per_page: *per_page,
                category: category.as_deref(),
            };
            dispatch(*resource, op, config, session).await
        }
        Command::Show { resource, key } => {
            dispatch(*resource, ResourceOp::Show(key), config, session).await
        }
        Command::Create { resource, data } => {
            dispatch(*resource, ResourceOp::Create(data), config, session).await
        }
        Command::Update {
            resource,
            key,
            data,
        } => dispatch(*resource, ResourceOp::Update(key, data), config, session).await,
        Command::Delete { resource, key, yes } => {
            dispatch(*resource, ResourceOp::Delete(key, *yes), config, session).await
        }
        Command::Theme { command } => run_theme(command, config, session).await,
        Command::Contact {
            name,
            email,
            subject,
            message,
        } => {
            let message = ContactMessage {
                name: name.clone(),
                email: email.clone(),
                subject: subject.clone(),
                message: message.clone(),
            };
            message.send(session.api()).await?;
            Ok(())
        }
        Command::RequestAccess {
            product_id,
            name,
            email,
            message,
        } => {
            let request = ProductAccessRequest {
                product_id: *product_id,
                name: name.clone(),
                email: email.clone(),
                message: message.clone(),
            };
            request.send(session.api()).await?;
            Ok(())
        }
    }
}

async fn dispatch(
    resource: Resource,
    op: ResourceOp<'_>,
    config: &ClientConfig,
    session: &AuthSession,
) -> Result<(), CliError> {
    match resource {
        Resource::Projects => run_resource::<Project>(op, config, session).await,
        Resource::Products => run_resource::<Product>(op, config, session).await,
        Resource::Skills => run_resource::<Skill>(op, config, session).await,
        Resource::Blog => run_resource::<BlogPost>(op, config, session).await,
        Resource::About => run_resource::<AboutRecord>(op, config, session).await,
    }
}

/// Gate on an authenticated admin session.
fn require_admin(config: &ClientConfig, session: &AuthSession) -> Result<(), CliError> {
    let mut redirect = Redirect::default();
    match config.guard().check(&session.snapshot(), &mut redirect) {
        GuardState::Authorized => Ok(()),
        GuardState::Checking | GuardState::Unauthorized => Err(CliError::LoginRequired(
            redirect.0.unwrap_or_else(|| config.login_route.clone()),
        )),
    }
}

async fn run_resource<E: Entity>(
    op: ResourceOp<'_>,
    config: &ClientConfig,
    session: &AuthSession,
) -> Result<(), CliError> {
    if op.mutates() {
        require_admin(config, session)?;
    }
    let mut controller = CrudController::<E>::new(session.api().clone(), config.fallback);

    match op {
        ResourceOp::List {
            page,
            per_page,
            category,
        } => {
            let items = controller.list().await?;
            let filtered = filter_by_category(items, category.unwrap_or("all"));
            let page = paginate(&filtered, page, per_page);
            print_json(&serde_json::json!({
                "items": page.items,
                "page": page.page,
                "perPage": page.per_page,
                "totalItems": page.total_items,
                "totalPages": page.total_pages,
            }))
        }
        ResourceOp::Show(key) => {
            let entity = controller.fetch(&parse_key::<E>(key)?).await?;
            print_json(&entity)
        }
        ResourceOp::Create(data) => {
            let draft: E = serde_json::from_str(data)?;
            controller.begin_create_with(draft);
            let created = controller.submit().await?;
            print_json(&created)
        }
        ResourceOp::Update(key, data) => {
            let key = parse_key::<E>(key)?;
            let current = controller.fetch(&key).await?;
            let draft: E = merge_json(&current, data)?;
            let updated = controller.update(&key, draft).await?;
            print_json(&updated)
        }
        ResourceOp::Delete(key, yes) => {
            let key = parse_key::<E>(key)?;
            let prompt = format!("Delete {} {}?", E::LABEL, key);
            let confirmation = controller.request_delete(key);
            if !yes && !confirm(&prompt)? {
                return Err(CliError::Aborted);
            }
            controller.delete(confirmation).await?;
            Ok(())
        }
    }
}

async fn run_theme(
    command: &ThemeCommand,
    config: &ClientConfig,
    session: &AuthSession,
) -> Result<(), CliError> {
    let mut theme = ThemeController::new(session.api().clone(), config.fallback);
    match command {
        ThemeCommand::Show => print_json(theme.load().await?),
        ThemeCommand::Set { data } => {
            require_admin(config, session)?;
            let current = theme.load().await?.clone();
            let updated: ThemeSettings = merge_json(&current, data)?;
            print_json(theme.save(updated).await?)
        }
    }
}

fn parse_key<E: Entity>(raw: &str) -> Result<E::Key, CliError> {
    raw.parse()
        .map_err(|_| CliError::InvalidInput(format!("'{}' is not a valid {} key", raw, E::LABEL)))
}

/// Overlay the top-level keys of the JSON object `patch` onto `base`.
fn merge_json<T>(base: &T, patch: &str) -> Result<T, CliError>
where
    T: Serialize + serde::de::DeserializeOwned,
{
    let patch: Map<String, Value> = match serde_json::from_str(patch)? {
        Value::Object(map) => map,
        _ => return Err(CliError::InvalidInput("--data must be a JSON object".into())),
    };
    let mut merged = match serde_json::to_value(base)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    merged.extend(patch);
    Ok(serde_json::from_value(Value::Object(merged))?)
}

fn status_json(session: &AuthSession) -> Value {
    let snapshot = session.snapshot();
    let expires_in = snapshot
        .access_token
        .as_deref()
        .and_then(jwt::expires_in)
        .map(|d| d.as_secs());
    serde_json::json!({
        "authenticated": snapshot.is_authenticated,
        "admin": snapshot.is_admin,
        "user": snapshot.user,
        "expiresInSecs": expires_in,
        "lastError": snapshot.last_error,
    })
}

fn confirm(prompt: &str) -> Result<bool, CliError> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{} [y/N] ", prompt)?;
    stderr.flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
