use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use client::admin::{ConfigEditor, SearchLogPager, UserDirectory};
use client::api;
use client::api::vehicle::Acknowledged;
use client::search::{
    JsonFileStore, MemoryRecentStore, RecentSearches, RecentStore, SearchCoordinator, run_search,
};
use client::session::RejectReason;
use client::vehicle::{FieldFilter, Highlighter};
use client::{AdminError, ApiClient, ApiResult, AuthSession, ErrorCategory, MemoryTokenStore, SessionState};
use shared::config::load_or_default;
use shared::types::client_config::ClientConfig;
use shared::types::{NewUser, UserProfile, capture_fragment_token};

use crate::cli::{AdminCommand, Cli, Commands, ConfigCommand, LoginCommand, RecentCommand, SearchArgs, render};

/// Everything a command needs, built once from the global flags.
struct App {
    config: ClientConfig,
    session: AuthSession,
}

impl App {
    fn new(cli: &Cli) -> Result<Self> {
        let config = load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;

        let tokens = match cli.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => MemoryTokenStore::with_token(token),
            None => MemoryTokenStore::new(),
        };

        let api = ApiClient::new(&config.api, Arc::new(tokens));
        let session = AuthSession::new(api, &config.auth);

        Ok(Self { config, session })
    }

    fn api(&self) -> &ApiClient {
        self.session.api()
    }

    fn recent(&self) -> RecentSearches {
        let store: Box<dyn RecentStore> = match &self.config.search.recent_searches_path {
            Some(path) => Box::new(JsonFileStore::new(path)),
            None => match JsonFileStore::default_location() {
                Ok(store) => Box::new(store),
                Err(e) => {
                    warn!("Recent searches will not be kept: {}", e);
                    Box::new(MemoryRecentStore::default())
                }
            },
        };
        RecentSearches::load(store, self.config.search.max_recent)
    }

    /// Confirm the stored token. Prints the reason and returns `None` when
    /// there is no usable session.
    async fn signed_in(&self) -> Option<UserProfile> {
        match self.session.start().await {
            SessionState::Authenticated(user) => Some(user),
            _ => {
                match self.session.last_rejection() {
                    Some(RejectReason::FetchFailed(msg)) => {
                        render::failure(ErrorCategory::from_message(&msg), &msg)
                    }
                    Some(reason) => eprintln!("Not signed in: {}. Run `rcview login` again.", reason),
                    None => eprintln!("Not signed in. Run `rcview login` or pass --token."),
                }
                None
            }
        }
    }

    async fn signed_in_admin(&self) -> Option<UserProfile> {
        let user = self.signed_in().await?;
        if !user.role.is_admin() {
            eprintln!("{} is not an administrator", user.email);
            return None;
        }
        Some(user)
    }
}

/// Print a failed call and produce the failing exit code.
fn fail<T>(result: &ApiResult<T>, fallback: &str) -> ExitCode {
    let message = result.error_or(fallback);
    render::failure(ErrorCategory::of(result), &message);
    ExitCode::FAILURE
}

fn admin_fail(e: AdminError) -> ExitCode {
    match &e {
        AdminError::Api { .. } => {
            let message = e.to_string();
            render::failure(ErrorCategory::from_message(&message), &message);
        }
        _ => eprintln!("{}", e),
    }
    ExitCode::FAILURE
}

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let app = App::new(&cli)?;

    match cli.command {
        Commands::Login(cmd) => login(&app, cmd).await,
        Commands::Whoami => match app.signed_in().await {
            Some(user) => {
                render::profile(&user);
                Ok(ExitCode::SUCCESS)
            }
            None => Ok(ExitCode::FAILURE),
        },
        Commands::Search(args) => search(&app, args).await,
        Commands::Unmask(args) => {
            if !args.yes {
                bail!("Unmasking is recorded in the audit log; pass --yes to confirm");
            }
            if app.signed_in().await.is_none() {
                return Ok(ExitCode::FAILURE);
            }
            let result =
                api::vehicle::unmask(app.api(), args.registration_number.trim(), Acknowledged::confirm()).await;
            match result.data {
                Some(unmasked) => {
                    println!("{}", unmasked.registration_number);
                    Ok(ExitCode::SUCCESS)
                }
                None => Ok(fail(&result, "Failed to unmask registration number.")),
            }
        }
        Commands::RateLimit => {
            if app.signed_in().await.is_none() {
                return Ok(ExitCode::FAILURE);
            }
            let coordinator = SearchCoordinator::new();
            render::rate_limit(coordinator.refresh_rate_limit(app.api()).await);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Recent { command } => recent(&app, command.unwrap_or(RecentCommand::List)),
        Commands::Admin(cmd) => admin(&app, cmd).await,
    }
}

async fn login(app: &App, cmd: LoginCommand) -> Result<ExitCode> {
    let token = match cmd {
        LoginCommand::Url => {
            println!("{}", api::auth::google_authorization_url(app.api()));
            println!("After signing in, run `rcview login capture <redirected URL>`.");
            return Ok(ExitCode::SUCCESS);
        }
        LoginCommand::Dev => {
            let result = api::auth::dev_login(app.api()).await;
            match result.data {
                Some(response) => response.token,
                None => return Ok(fail(&result, "Dev login failed.")),
            }
        }
        LoginCommand::Capture { url } => match capture_fragment_token(&url) {
            Some((token, clean_url)) => {
                debug!("Captured token from {}", clean_url);
                token
            }
            None => bail!("No #token= fragment found in the URL"),
        },
    };

    match app.session.set_token(Some(&token)).await {
        SessionState::Authenticated(user) => {
            println!("Signed in as {} ({})", user.email, user.role);
            println!("export RCVIEW_TOKEN={}", token);
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            let reason = app
                .session
                .last_rejection()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "unknown reason".to_string());
            eprintln!("The issued token was not accepted: {}", reason);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn search(app: &App, args: SearchArgs) -> Result<ExitCode> {
    if app.signed_in().await.is_none() {
        return Ok(ExitCode::FAILURE);
    }

    let coordinator = SearchCoordinator::new();
    let mut recent = app.recent();

    let Some(result) = run_search(app.api(), &coordinator, &mut recent, &args.registration_number).await else {
        bail!("Registration number is empty");
    };

    if let Some(message) = result.error_message() {
        let category = result.error_category().unwrap_or(ErrorCategory::Unknown);
        render::failure(category, message);
        return Ok(ExitCode::FAILURE);
    }

    let filter = FieldFilter::new(args.filter.as_deref(), args.section);
    let sections = filter.apply(result.sections());
    let highlighter = Highlighter::new(filter.term.as_deref().unwrap_or(""));

    println!(
        "{}{}",
        result
            .response
            .registration_number
            .as_deref()
            .unwrap_or(&result.registration_number),
        if result.response.is_cached() { "  (cached)" } else { "" }
    );

    if sections.is_empty() {
        println!("\nNo fields match the current filter");
    } else {
        render::sections(&sections, &highlighter);
    }

    if let Some(counters) = coordinator.refresh_rate_limit(app.api()).await {
        println!();
        render::rate_limit(Some(counters));
    }

    Ok(ExitCode::SUCCESS)
}

fn recent(app: &App, cmd: RecentCommand) -> Result<ExitCode> {
    let mut recent = app.recent();

    match cmd {
        RecentCommand::List => {
            if recent.terms().is_empty() {
                println!("No recent searches");
            }
            for term in recent.terms() {
                println!("{}", term);
            }
        }
        RecentCommand::Remove { registration_number } => {
            if !recent.remove(&registration_number).context("Failed to update recent searches")? {
                eprintln!("{} is not in the recent list", registration_number.trim());
                return Ok(ExitCode::FAILURE);
            }
        }
        RecentCommand::Clear => recent.clear().context("Failed to clear recent searches")?,
    }

    Ok(ExitCode::SUCCESS)
}

async fn admin(app: &App, cmd: AdminCommand) -> Result<ExitCode> {
    if app.signed_in_admin().await.is_none() {
        return Ok(ExitCode::FAILURE);
    }

    let api = app.api().clone();

    match cmd {
        AdminCommand::Users { search } => {
            let directory = UserDirectory::new(api, app.config.search.user_search_debounce());
            let result = directory.reload(search.as_deref()).await;
            match result.data {
                Some(rows) => render::users(&rows),
                None => return Ok(fail(&result, "Failed to load users.")),
            }
        }
        AdminCommand::AddUser {
            email,
            name,
            role,
            no_sso,
        } => {
            let directory = UserDirectory::new(api, app.config.search.user_search_debounce());
            let user = NewUser {
                email,
                name,
                role,
                sso_enabled: !no_sso,
            };
            match directory.add(user).await {
                Ok(row) => println!("Added {} ({})", row.email, row.role),
                Err(e) => return Ok(admin_fail(e)),
            }
        }
        AdminCommand::RemoveUser { id } => {
            let directory = UserDirectory::new(api, app.config.search.user_search_debounce());
            let Some(row) = find_user(&directory, &id).await? else {
                return Ok(ExitCode::FAILURE);
            };
            match directory.remove(&row).await {
                Ok(()) => println!("Removed {}", row.email),
                Err(e) => return Ok(admin_fail(e)),
            }
        }
        AdminCommand::SetRole { id, role } => {
            let directory = UserDirectory::new(api, app.config.search.user_search_debounce());
            let Some(row) = find_user(&directory, &id).await? else {
                return Ok(ExitCode::FAILURE);
            };
            match directory.set_role(&row, role).await {
                Ok(()) => println!("{} is now {}", row.email, role),
                Err(e) => return Ok(admin_fail(e)),
            }
        }
        AdminCommand::Config(cmd) => {
            let mut editor = ConfigEditor::new(api);
            let loaded = editor.load().await;
            if loaded.data.is_none() {
                return Ok(fail(&loaded, "Failed to load configuration."));
            }

            match cmd {
                ConfigCommand::Show => {
                    if let Some(config) = editor.authoritative() {
                        render::app_config(config);
                    }
                }
                ConfigCommand::Set {
                    cache_ttl_days,
                    rate_limit_per_second,
                    rate_limit_per_day,
                } => {
                    if let Some(draft) = editor.draft_mut() {
                        if let Some(v) = cache_ttl_days {
                            draft.cache_ttl_days = v;
                        }
                        if let Some(v) = rate_limit_per_second {
                            draft.rate_limit_per_second = v;
                        }
                        if let Some(v) = rate_limit_per_day {
                            draft.rate_limit_per_day_default = v;
                        }
                    }

                    if !editor.is_dirty() {
                        println!("Nothing to change");
                        return Ok(ExitCode::SUCCESS);
                    }

                    match editor.save().await {
                        Ok(config) => render::app_config(&config),
                        Err(e) => return Ok(admin_fail(e)),
                    }
                }
            }
        }
        AdminCommand::Stats => {
            let result = api::admin::search_stats(&api).await;
            match result.data {
                Some(stats) => render::stats(&stats),
                None => return Ok(fail(&result, "Failed to load statistics.")),
            }
        }
        AdminCommand::Logs { page, size } => {
            let mut pager = SearchLogPager::new(api, size.unwrap_or(app.config.search.log_page_size));
            let result = pager.goto(page).await;
            match result.data {
                Some(page) => render::logs(&page),
                None => return Ok(fail(&result, "Failed to load search logs.")),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Look a user up by id through the directory listing.
async fn find_user(directory: &UserDirectory, id: &str) -> Result<Option<shared::types::UserRow>> {
    let result = directory.reload(None).await;
    let Some(rows) = result.data else {
        fail(&result, "Failed to load users.");
        return Ok(None);
    };

    match rows.into_iter().find(|r| r.id == id.trim()) {
        Some(row) => Ok(Some(row)),
        None => {
            eprintln!("No user with id {}", id.trim());
            Ok(None)
        }
    }
}
