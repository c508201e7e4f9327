use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use runtime::{AppConfig, ClientConfig};

use card_portal::contract::filter::CardFilter;
use card_portal::contract::model::{CardStatus, Credentials, NewCard, NewIdentity};
use card_portal::infra::storage::FileStore;
use card_portal::views::{
    AdminBlocksView, AdminCardsView, AdminUsersView, Availability, BlocksView, CardsView,
    Confirm, FixedAnswer, Notice, Screen, Tab,
};
use card_portal::{CardPortal, PortalConfig};

use crate::render;
use crate::{
    AdminBlocksCommand, AdminCardsCommand, AdminCommand, AdminUsersCommand, BlocksCommand,
    CardsCommand, FilterArgs, PageArgs, PortalCommand,
};

/// Name of the persisted session file inside `home_dir`.
const SESSION_FILE: &str = "session.json";

/// Reads y/n from stdin; anything but "y"/"yes" declines.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn portal_config(client: &ClientConfig) -> PortalConfig {
    PortalConfig {
        api_base_url: client.api_base_url.clone(),
        page_size: client.page_size,
        timeout_sec: client.timeout_sec,
    }
}

/// Restore the session and run one command against the API.
pub async fn run(config: AppConfig, command: PortalCommand, assume_yes: bool) -> Result<ExitCode> {
    let store = Arc::new(FileStore::new(config.home_dir().join(SESSION_FILE)));
    let portal = CardPortal::start(portal_config(&config.client), store)
        .await
        .context("Failed to start the card portal client")?;
    let confirm: Box<dyn Confirm> = if assume_yes {
        Box::new(FixedAnswer(true))
    } else {
        Box::new(StdinConfirm)
    };

    match command {
        PortalCommand::Login(creds) => {
            let who = portal
                .session()
                .login(&Credentials::new(creds.email, creds.password))
                .await?;
            println!("Signed in as {} ({})", who.email, who.role_name);
            Ok(ExitCode::SUCCESS)
        }
        PortalCommand::Register(creds) => {
            let who = portal
                .session()
                .register(&Credentials::new(creds.email, creds.password))
                .await?;
            println!("Registered and signed in as {} ({})", who.email, who.role_name);
            Ok(ExitCode::SUCCESS)
        }
        PortalCommand::Logout => {
            portal.session().logout();
            println!("Signed out");
            Ok(ExitCode::SUCCESS)
        }
        PortalCommand::Whoami => {
            render::screen(&portal.screen(), portal.session().current().identity.as_ref());
            Ok(ExitCode::SUCCESS)
        }
        PortalCommand::Cards { command } => {
            require(&portal, Tab::Cards)?;
            cards(&portal, command).await
        }
        PortalCommand::Blocks { command } => {
            require(&portal, Tab::Blocks)?;
            blocks(&portal, command, confirm.as_ref()).await
        }
        PortalCommand::Transfer(args) => {
            require(&portal, Tab::Transfer)?;
            let mut view = portal.transfer_view();
            view.reload().await;
            let mut notices = view.take_notices();
            match view.availability() {
                _ if !notices.is_empty() => {}
                Availability::NoCards => {
                    notices.push(Notice::error("You have no cards; transfers need at least two"))
                }
                Availability::NeedMoreCards => {
                    notices.push(Notice::error("Transfers need at least two cards; you have one"))
                }
                Availability::Ready => {
                    let form = view.form_mut();
                    form.from_card_id = Some(args.from);
                    form.to_card_id = Some(args.to);
                    form.amount = Some(args.amount);
                    view.submit().await;
                    notices.extend(view.take_notices());
                    render::cards(view.own_cards(), None);
                }
            }
            Ok(finish(&notices))
        }
        PortalCommand::Admin { command } => admin(&portal, command, confirm.as_ref()).await,
    }
}

/// Validate the configuration without contacting the server.
pub fn check_config(config: &AppConfig) -> Result<ExitCode> {
    tracing::info!("Checking configuration...");
    // Building the portal validates the API base URL.
    CardPortal::new(
        portal_config(&config.client),
        Arc::new(FileStore::new(config.home_dir().join(SESSION_FILE))),
    )
    .context("Invalid client configuration")?;

    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(ExitCode::SUCCESS)
}

/// Refuse screens the session cannot reach.
fn require(portal: &CardPortal, tab: Tab) -> Result<()> {
    let session = portal.session().current();
    if tab.is_reachable(&session) {
        return Ok(());
    }
    match portal.screen() {
        Screen::Dashboard { .. } => bail!("'{tab}' requires the ADMIN role"),
        _ => bail!("Not signed in; run `cardctl login` first"),
    }
}

/// Print notices and turn any error among them into a failing exit code.
fn finish(notices: &[Notice]) -> ExitCode {
    render::notices(notices);
    if notices.iter().any(Notice::is_error) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn page_size(portal: &CardPortal, page: &PageArgs) -> u32 {
    page.size.unwrap_or(portal.config().page_size)
}

fn card_filter(args: &FilterArgs) -> Result<CardFilter> {
    let status = match args.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) if s.eq_ignore_ascii_case("ALL") => None,
        Some(s) => Some(s.parse::<CardStatus>()?),
    };
    Ok(CardFilter {
        last_four_digits: args.last_four_digits.clone(),
        status,
        min_balance: args.min_balance,
        max_balance: args.max_balance,
    })
}

async fn cards(portal: &CardPortal, command: CardsCommand) -> Result<ExitCode> {
    match command {
        CardsCommand::List { page, filter } => {
            let mut view = CardsView::new(portal.cards(), portal.blocks(), page_size(portal, &page));
            *view.draft_mut() = card_filter(&filter)?;
            view.search_at(page.page).await;
            render::listing_cards(view.listing(), view.empty_message());
            Ok(finish(&view.listing_mut().take_notices()))
        }
        CardsCommand::Block { card_id } => {
            let mut view = portal.cards_view();
            view.reload().await;
            view.request_block(card_id).await;
            render::listing_cards(view.listing(), view.empty_message());
            Ok(finish(&view.listing_mut().take_notices()))
        }
    }
}

async fn blocks(portal: &CardPortal, command: BlocksCommand, confirm: &dyn Confirm) -> Result<ExitCode> {
    let mut view = match &command {
        BlocksCommand::List { page } => BlocksView::new(portal.blocks(), page_size(portal, page)),
        BlocksCommand::Cancel { .. } => portal.blocks_view(),
    };
    match command {
        BlocksCommand::List { page } => view.set_page(page.page).await,
        BlocksCommand::Cancel { id } => {
            view.reload().await;
            view.cancel(id, confirm).await;
        }
    }
    render::listing_blocks(view.listing(), view.empty_message());
    Ok(finish(&view.listing_mut().take_notices()))
}

async fn admin(portal: &CardPortal, command: AdminCommand, confirm: &dyn Confirm) -> Result<ExitCode> {
    match command {
        AdminCommand::Users { command } => {
            require(portal, Tab::AdminUsers)?;
            admin_users(portal, command, confirm).await
        }
        AdminCommand::Cards { command } => {
            require(portal, Tab::AdminCards)?;
            admin_cards(portal, command, confirm).await
        }
        AdminCommand::Blocks { command } => {
            require(portal, Tab::AdminBlocks)?;
            admin_blocks(portal, command, confirm).await
        }
    }
}

async fn admin_users(
    portal: &CardPortal,
    command: AdminUsersCommand,
    confirm: &dyn Confirm,
) -> Result<ExitCode> {
    let mut view = match &command {
        AdminUsersCommand::List { page } => {
            AdminUsersView::new(portal.users(), page_size(portal, page))
        }
        _ => portal.admin_users_view(),
    };
    match command {
        AdminUsersCommand::List { page } => view.set_page(page.page).await,
        AdminUsersCommand::Create {
            email,
            password,
            role,
        } => {
            view.create(&NewIdentity {
                email,
                password,
                role,
            })
            .await
        }
        AdminUsersCommand::Role { id, role } => view.change_role(id, role).await,
        AdminUsersCommand::Lock { id } => view.toggle_lock(id).await,
        AdminUsersCommand::Enable { id } => view.toggle_enable(id).await,
        AdminUsersCommand::Delete { id } => view.delete(id, confirm).await,
    }
    render::listing_users(view.listing());
    Ok(finish(&view.listing_mut().take_notices()))
}

async fn admin_cards(
    portal: &CardPortal,
    command: AdminCardsCommand,
    confirm: &dyn Confirm,
) -> Result<ExitCode> {
    let mut view = match &command {
        AdminCardsCommand::List { page, .. } => {
            AdminCardsView::new(portal.cards(), portal.users(), page_size(portal, page))
        }
        _ => portal.admin_cards_view(),
    };
    match command {
        AdminCardsCommand::List { page, filter } => {
            *view.draft_mut() = card_filter(&filter)?;
            view.search_at(page.page).await;
        }
        AdminCardsCommand::Create {
            user,
            expiry,
            status,
            balance,
        } => {
            view.load_owners().await;
            view.create(&NewCard {
                user_id: user,
                expiry_date: expiry,
                status,
                balance,
            })
            .await;
        }
        AdminCardsCommand::Status { id, status } => view.change_status(id, status).await,
        AdminCardsCommand::Expiry { id, expiry } => view.change_expiry(id, expiry).await,
        AdminCardsCommand::Delete { id } => view.delete(id, confirm).await,
    }
    render::listing_cards(view.listing(), view.empty_message());
    Ok(finish(&view.listing_mut().take_notices()))
}

async fn admin_blocks(
    portal: &CardPortal,
    command: AdminBlocksCommand,
    confirm: &dyn Confirm,
) -> Result<ExitCode> {
    let mut view = match &command {
        AdminBlocksCommand::List { page } => {
            AdminBlocksView::new(portal.blocks(), page_size(portal, page))
        }
        _ => portal.admin_blocks_view(),
    };
    match command {
        AdminBlocksCommand::List { page } => view.set_page(page.page).await,
        AdminBlocksCommand::Approve { id, comment } => {
            view.reload().await;
            view.approve(id, &comment).await;
        }
        AdminBlocksCommand::Reject { id, comment } => {
            view.reload().await;
            view.reject(id, &comment).await;
        }
        AdminBlocksCommand::Delete { id } => view.delete(id, confirm).await,
    }
    render::listing_blocks(view.listing(), view.empty_message());
    Ok(finish(&view.listing_mut().take_notices()))
}
