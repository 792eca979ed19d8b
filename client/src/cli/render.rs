use client::ErrorCategory;
use client::search::RateLimitCounters;
use client::vehicle::{Highlighter, Sections, format_value, label_for_key};
use shared::types::{AppConfig, Page, SearchLogEntry, SearchStats, UserProfile, UserRow};

const MARK_ON: &str = "\x1b[1;30;43m";
const MARK_OFF: &str = "\x1b[0m";

fn marked(highlighter: &Highlighter, text: &str) -> String {
    highlighter
        .segments(text)
        .into_iter()
        .map(|s| {
            if s.matched {
                format!("{}{}{}", MARK_ON, s.text, MARK_OFF)
            } else {
                s.text
            }
        })
        .collect()
}

pub fn sections(sections: &Sections, highlighter: &Highlighter) {
    let width = sections
        .iter()
        .flat_map(|s| s.fields.keys())
        .map(|k| label_for_key(k).chars().count())
        .max()
        .unwrap_or(0);

    for section in sections {
        println!("\n== {} ==", section.label());
        for (key, value) in &section.fields {
            let label = label_for_key(key);
            let pad = width.saturating_sub(label.chars().count());
            println!(
                "  {}{}  {}",
                marked(highlighter, &label),
                " ".repeat(pad),
                marked(highlighter, &format_value(value))
            );
        }
    }
}

pub fn failure(category: ErrorCategory, message: &str) {
    eprintln!("{}", category.title());
    eprintln!("  {}", message);
    eprintln!("  {}", category.explanation());
    if category.offer_refresh() {
        eprintln!("  Retry the command once the service is back.");
    } else {
        eprintln!("  Check the input and retry.");
    }
}

pub fn profile(user: &UserProfile) {
    println!("Hello, {}", user.greeting_name());
    println!("  email  {}", user.email);
    if let Some(name) = &user.display_name {
        println!("  name   {}", name);
    }
    println!("  role   {}", user.role);
    println!("  sso    {}", if user.sso_enabled { "enabled" } else { "disabled" });
}

pub fn rate_limit(counters: Option<RateLimitCounters>) {
    match counters {
        Some(c) => println!("{} of {} searches left today", c.remaining, c.daily_limit),
        None => println!("No daily search limit configured"),
    }
}

pub fn users(rows: &[UserRow]) {
    if rows.is_empty() {
        println!("No users");
        return;
    }
    for row in rows {
        println!(
            "{:<26} {:<32} {:<12} {:<4} {}",
            row.id,
            row.email,
            row.role.as_str(),
            if row.sso_enabled { "sso" } else { "-" },
            row.name.as_deref().unwrap_or("")
        );
    }
}

pub fn app_config(config: &AppConfig) {
    println!("cache ttl (days)         {}", config.cache_ttl_days);
    println!("rate limit (per second)  {}", config.rate_limit_per_second);
    println!("daily limit (default)    {}", config.rate_limit_per_day_default);
    match (&config.updated_at, &config.updated_by) {
        (Some(at), Some(by)) => println!("updated                  {} by {}", at.format("%Y-%m-%d %H:%M"), by),
        (Some(at), None) => println!("updated                  {}", at.format("%Y-%m-%d %H:%M")),
        _ => println!("updated                  never (defaults)"),
    }
}

pub fn stats(stats: &SearchStats) {
    println!("total searches      {}", stats.total_searches);
    println!("today               {}", stats.today_searches);
    println!("unique users        {}", stats.unique_users);
    println!("unique numbers      {}", stats.unique_reg_numbers);
    if !stats.top_searchers.is_empty() {
        println!("\ntop searchers");
        for s in &stats.top_searchers {
            println!("  {:>6}  {}", s.count, s.email);
        }
    }
}

pub fn logs(page: &Page<SearchLogEntry>) {
    for entry in &page.content {
        println!(
            "{}  {:<28} {:<14} {:<20}{}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.user_email,
            entry.registration_number,
            entry.outcome.as_str(),
            if entry.from_cache { " (cache)" } else { "" }
        );
    }
    println!(
        "\npage {} of {} ({} entries){}",
        page.number + 1,
        page.total_pages.max(1),
        page.total_elements,
        if page.last { "" } else { ", more with --page" }
    );
}
