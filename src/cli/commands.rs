use serde::Serialize;

use crate::app::{AppContext, Result};
use crate::server::routes::SearchResponse;
use crate::server::{self, AppState};

pub async fn serve(ctx: &AppContext) -> Result<()> {
    let state = AppState::new(ctx);
    server::run_server(state, &ctx.config.server.bind_address()).await
}

pub async fn explore(ctx: &AppContext, number: usize) -> Result<()> {
    let batch = ctx
        .harvester
        .collect_explore_items(number, ctx.config.scraper.headless)
        .await?;
    print_json(&batch)
}

pub async fn search(ctx: &AppContext, keywords: &str, number: usize) -> Result<()> {
    let mut videos = ctx.harvester.search_videos_by_keywords(keywords).await?;
    videos.truncate(number);
    print_json(&SearchResponse {
        keywords: keywords.trim().to_string(),
        count: videos.len(),
        videos,
    })
}

pub async fn links(ctx: &AppContext) -> Result<()> {
    let links = ctx
        .harvester
        .explore_links(ctx.config.scraper.headless)
        .await?;
    if links.is_empty() {
        eprintln!("No video links found");
    }
    print_json(&links)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
