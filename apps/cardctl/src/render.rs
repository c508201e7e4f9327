//! Plain-text output. Data goes to stdout, notices about failures to stderr.

use card_portal::contract::model::{BlockRequest, Card, Identity};
use card_portal::views::{Listing, LoadState, Notice, NoticeLevel, Screen};

pub fn notices(notices: &[Notice]) {
    for n in notices {
        match n.level {
            NoticeLevel::Success => println!("ok: {n}"),
            NoticeLevel::Info => println!("note: {n}"),
            NoticeLevel::Error => eprintln!("error: {n}"),
        }
    }
}

pub fn screen(screen: &Screen, identity: Option<&Identity>) {
    match (screen, identity) {
        (Screen::Loading, _) => println!("Restoring session..."),
        (Screen::Dashboard { tabs }, Some(who)) => {
            println!("Signed in as {} ({})", who.email, who.role_name);
            let titles: Vec<&str> = tabs.iter().map(|t| t.title()).collect();
            println!("Screens: {}", titles.join(", "));
        }
        _ => println!("Not signed in. Use `cardctl login` or `cardctl register`."),
    }
}

fn card_line(card: &Card) -> String {
    format!(
        "#{:<5} {}  {:<8} {:>12}  exp {}  {}",
        card.id,
        card.masked_card_number,
        card.status_name.as_str(),
        card.balance.round_dp(2),
        card.expiry_date,
        card.owner_email
    )
}

fn block_line(request: &BlockRequest) -> String {
    let day = request
        .requested_on()
        .map(|d| d.to_string())
        .unwrap_or_else(|| request.request_date.clone());
    let mut line = format!(
        "#{:<5} card {:<6} {:<9} {}",
        request.id,
        request.card_id,
        request.status.as_str(),
        day
    );
    if let Some(comment) = request.admin_comment.as_deref().filter(|c| !c.is_empty()) {
        line.push_str(&format!("  \"{comment}\""));
    }
    line
}

fn user_line(user: &Identity) -> String {
    format!(
        "#{:<5} {:<32} {:<6} {} {}",
        user.id,
        user.email,
        user.role_name.as_str(),
        if user.is_enabled { "enabled " } else { "disabled" },
        if user.is_locked() { "locked" } else { "unlocked" }
    )
}

pub fn cards(cards: &[Card], empty: Option<&str>) {
    if cards.is_empty() {
        if let Some(msg) = empty {
            println!("{msg}");
        }
        return;
    }
    for card in cards {
        println!("{}", card_line(card));
    }
}

fn footer<T>(listing: &Listing<T>) {
    let Some(page) = listing.current() else {
        return;
    };
    if page.total_pages == 0 {
        return;
    }
    let nav = listing.nav();
    let mut hints = Vec::new();
    if !nav.prev_disabled {
        hints.push(format!("--page {} for previous", nav.page - 1));
    }
    if !nav.next_disabled {
        hints.push(format!("--page {} for next", nav.page + 1));
    }
    let hints = if hints.is_empty() {
        String::new()
    } else {
        format!(" ({})", hints.join(", "))
    };
    println!(
        "page {}/{} of {} total{}",
        page.number + 1,
        page.total_pages,
        page.total_elements,
        hints
    );
}

fn print_listing<T>(listing: &Listing<T>, empty: Option<&str>, line: impl Fn(&T) -> String) {
    if listing.state() == LoadState::Errored && listing.current().is_none() {
        return;
    }
    if let Some(msg) = empty {
        println!("{msg}");
        return;
    }
    for item in listing.items() {
        println!("{}", line(item));
    }
    footer(listing);
}

pub fn listing_cards(cards: &Listing<Card>, empty: Option<&str>) {
    print_listing(cards, empty, card_line);
}

pub fn listing_blocks(blocks: &Listing<BlockRequest>, empty: Option<&str>) {
    print_listing(blocks, empty, block_line);
}

pub fn listing_users(users: &Listing<Identity>) {
    let empty = users.is_empty().then_some("There are no users");
    print_listing(users, empty, user_line);
}
