use anyhow::Result;
use arboard::Clipboard;
use chrono::{Datelike, Utc};
use crossterm::event::KeyCode;
use tokio::runtime::Runtime;

use crate::App;
use crate::filters::FilterPatch;
use crate::models::{FocusArea, View};

const LIMIT_STEP: u32 = 25;
const MIN_LIMIT: u32 = 25;
const MAX_LIMIT: u32 = 200;
// No launches before this year, so decrementing past it clears the bound.
const FIRST_LAUNCH_YEAR: i32 = 2006;

pub fn handle_key(key: KeyCode, app: &mut App, rt: &Runtime) -> Result<bool> {
    match key {
        KeyCode::Char('q') => return Ok(false),
        KeyCode::Char('1') => switch_view(app, rt, View::Dashboard),
        KeyCode::Char('2') => switch_view(app, rt, View::Launches),
        KeyCode::Char('3') => switch_view(app, rt, View::Starlink),
        KeyCode::Tab => switch_view(app, rt, app.view.next()),
        KeyCode::BackTab => switch_view(app, rt, app.view.prev()),
        KeyCode::Char('r') => spawn_view_fetch(app, rt, true),
        KeyCode::Up | KeyCode::Char('k') => move_selection(app, -1),
        KeyCode::Down | KeyCode::Char('j') => move_selection(app, 1),
        KeyCode::Left => change_page(app, rt, -1),
        KeyCode::Right => change_page(app, rt, 1),
        KeyCode::Char('h') => cycle_focus(app, false),
        KeyCode::Char('l') => cycle_focus(app, true),
        KeyCode::Char('+') => change_limit(app, rt, 1),
        KeyCode::Char('-') => change_limit(app, rt, -1),
        KeyCode::Char('s') => bump_year(app, rt, YearBound::Start, 1),
        KeyCode::Char('S') => bump_year(app, rt, YearBound::Start, -1),
        KeyCode::Char('e') => bump_year(app, rt, YearBound::End, 1),
        KeyCode::Char('E') => bump_year(app, rt, YearBound::End, -1),
        KeyCode::Char('x') => reset_filters(app, rt),
        KeyCode::Enter => apply_rocket_selection(app, rt),
        KeyCode::Char(' ') => toggle_details(app),
        KeyCode::Char('c') => copy_selected_launch(app),
        KeyCode::Esc => {
            app.show_details = false;
            app.detail_scroll = 0;
            app.status = None;
        }
        _ => {}
    }
    Ok(true)
}

fn switch_view(app: &mut App, rt: &Runtime, view: View) {
    if app.view == view {
        return;
    }
    app.view = view;
    app.show_details = false;
    app.detail_scroll = 0;
    app.status = None;
    spawn_view_fetch(app, rt, false);
}

/// Fetches the current view's data. Already-loaded views are skipped unless
/// `force` is set; the rocket catalog is only requested once.
pub fn spawn_view_fetch(app: &App, rt: &Runtime, force: bool) {
    match app.view {
        View::Dashboard => {
            if force || !app.dashboard.lock().unwrap().loaded {
                spawn_dashboard_fetch(app, rt);
            }
        }
        View::Launches => {
            let (loaded, include_rockets) = {
                let panel = app.launches.lock().unwrap();
                (panel.loaded, panel.rockets.is_empty())
            };
            if force || !loaded {
                spawn_launches_fetch(app, rt, include_rockets);
            }
        }
        View::Starlink => {
            if force || !app.starlink.lock().unwrap().loaded {
                spawn_starlink_fetch(app, rt);
            }
        }
    }
}

fn spawn_dashboard_fetch(app: &App, rt: &Runtime) {
    let client = app.client.clone();
    let loading = app.loading.clone();
    let panel = app.dashboard.clone();
    rt.spawn(async move {
        let result = loading
            .with_loading(|| async {
                let (company, latest, next) = futures::join!(
                    client.company(),
                    client.latest_launch(),
                    client.next_launch()
                );
                anyhow::Ok((company?, latest?, next?))
            })
            .await;
        let mut panel = panel.lock().unwrap();
        panel.loaded = true;
        match result {
            Ok((company, latest, next)) => {
                panel.company = Some(company);
                panel.latest = Some(latest);
                panel.next = Some(next);
                panel.error = None;
            }
            Err(err) => panel.error = Some(err.to_string()),
        }
    });
}

fn spawn_launches_fetch(app: &App, rt: &Runtime, include_rockets: bool) {
    let client = app.client.clone();
    let loading = app.loading.clone();
    let panel = app.launches.clone();
    let filters = app.filters.filters().clone();
    rt.spawn(async move {
        let result = loading
            .with_loading(|| async {
                let rockets = if include_rockets {
                    Some(client.rockets().await?)
                } else {
                    None
                };
                let launches = client.query_launches(&filters).await?;
                anyhow::Ok((rockets, launches))
            })
            .await;
        let mut panel = panel.lock().unwrap();
        panel.loaded = true;
        match result {
            Ok((rockets, launches)) => {
                if let Some(rockets) = rockets {
                    panel.rockets = rockets;
                }
                panel.launches = Some(launches);
                panel.error = None;
            }
            Err(err) => panel.error = Some(err.to_string()),
        }
    });
}

fn spawn_starlink_fetch(app: &App, rt: &Runtime) {
    let client = app.client.clone();
    let loading = app.loading.clone();
    let panel = app.starlink.clone();
    let filters = app.filters.filters().clone();
    rt.spawn(async move {
        let result = loading
            .with_loading(|| async { client.query_starlink(&filters).await })
            .await;
        let mut panel = panel.lock().unwrap();
        panel.loaded = true;
        match result {
            Ok(sats) => {
                panel.sats = Some(sats);
                panel.error = None;
            }
            Err(err) => panel.error = Some(err.to_string()),
        }
    });
}

fn move_selection(app: &mut App, delta: i64) {
    match app.view {
        View::Dashboard => {}
        View::Launches => match app.focus {
            FocusArea::Sidebar => {
                let count = app.launches.lock().unwrap().rockets.len();
                // `None` is the "All rockets" row above the catalog.
                app.selected_rocket = match (app.selected_rocket, delta >= 0) {
                    (None, true) if count > 0 => Some(0),
                    (None, _) => None,
                    (Some(0), false) => None,
                    (Some(i), false) => Some(i - 1),
                    (Some(i), true) if i + 1 < count => Some(i + 1),
                    (Some(i), true) => Some(i),
                };
            }
            FocusArea::LaunchList => {
                let count = app
                    .launches
                    .lock()
                    .unwrap()
                    .launches
                    .as_ref()
                    .map(|page| page.docs.len())
                    .unwrap_or(0);
                app.selected_launch = step_index(app.selected_launch, delta, count);
                app.detail_scroll = 0;
            }
            FocusArea::Detail => {
                if delta < 0 {
                    app.detail_scroll = app.detail_scroll.saturating_sub(1);
                } else {
                    app.detail_scroll = app.detail_scroll.saturating_add(1);
                }
            }
        },
        View::Starlink => {
            let count = app
                .starlink
                .lock()
                .unwrap()
                .sats
                .as_ref()
                .map(|page| page.docs.len())
                .unwrap_or(0);
            app.selected_sat = step_index(app.selected_sat, delta, count);
        }
    }
}

fn step_index(current: Option<usize>, delta: i64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    match current {
        None => Some(0),
        Some(i) if delta < 0 => Some(i.saturating_sub(1)),
        Some(i) => Some((i + 1).min(count - 1)),
    }
}

fn cycle_focus(app: &mut App, forward: bool) {
    if app.view != View::Launches {
        return;
    }
    app.focus = match (app.focus, forward) {
        (FocusArea::Sidebar, true) => FocusArea::LaunchList,
        (FocusArea::Sidebar, false) => {
            if app.show_details {
                FocusArea::Detail
            } else {
                FocusArea::LaunchList
            }
        }
        (FocusArea::LaunchList, true) => {
            if app.show_details {
                FocusArea::Detail
            } else {
                FocusArea::Sidebar
            }
        }
        (FocusArea::LaunchList, false) => FocusArea::Sidebar,
        (FocusArea::Detail, true) => FocusArea::Sidebar,
        (FocusArea::Detail, false) => FocusArea::LaunchList,
    };
}

fn change_page(app: &mut App, rt: &Runtime, delta: i64) {
    let total_pages = match app.view {
        View::Launches => app
            .launches
            .lock()
            .unwrap()
            .launches
            .as_ref()
            .map(|page| page.total_pages),
        View::Starlink => app.starlink.lock().unwrap().sats.as_ref().map(|page| page.total_pages),
        View::Dashboard => return,
    };
    let current = app.filters.filters().page;
    let mut page = if delta < 0 {
        current.saturating_sub(1).max(1)
    } else {
        current + 1
    };
    if let Some(total) = total_pages {
        page = page.min(total.max(1));
    }
    if page == current {
        return;
    }
    app.filters.set_filters(FilterPatch {
        page: Some(page),
        ..Default::default()
    });
    reload_paged_view(app, rt);
}

fn change_limit(app: &mut App, rt: &Runtime, delta: i64) {
    if app.view == View::Dashboard {
        return;
    }
    let current = app.filters.filters().limit;
    let limit = if delta < 0 {
        current.saturating_sub(LIMIT_STEP).max(MIN_LIMIT)
    } else {
        (current + LIMIT_STEP).min(MAX_LIMIT)
    };
    if limit == current {
        return;
    }
    app.filters.set_filters(FilterPatch {
        limit: Some(limit),
        page: Some(1),
        ..Default::default()
    });
    reload_paged_view(app, rt);
}

enum YearBound {
    Start,
    End,
}

fn bump_year(app: &mut App, rt: &Runtime, bound: YearBound, delta: i32) {
    if app.view != View::Launches {
        return;
    }
    let filters = app.filters.filters();
    let current = match bound {
        YearBound::Start => filters.start_year,
        YearBound::End => filters.end_year,
    };
    let seed = match bound {
        YearBound::Start => FIRST_LAUNCH_YEAR,
        YearBound::End => Utc::now().year(),
    };
    let next = match current {
        None => Some(seed),
        Some(year) if year + delta < FIRST_LAUNCH_YEAR => None,
        Some(year) => Some(year + delta),
    };
    let patch = match bound {
        YearBound::Start => FilterPatch {
            start_year: Some(next),
            page: Some(1),
            ..Default::default()
        },
        YearBound::End => FilterPatch {
            end_year: Some(next),
            page: Some(1),
            ..Default::default()
        },
    };
    app.filters.set_filters(patch);
    spawn_launches_fetch(app, rt, false);
    app.selected_launch = None;
}

fn reset_filters(app: &mut App, rt: &Runtime) {
    if app.view == View::Dashboard {
        return;
    }
    app.filters.reset();
    app.selected_rocket = None;
    app.selected_launch = None;
    app.selected_sat = None;
    reload_paged_view(app, rt);
}

fn apply_rocket_selection(app: &mut App, rt: &Runtime) {
    if app.view != View::Launches || app.focus != FocusArea::Sidebar {
        return;
    }
    let rocket_id = match app.selected_rocket {
        None => String::new(),
        Some(i) => {
            let panel = app.launches.lock().unwrap();
            match panel.rockets.get(i) {
                Some(rocket) => rocket.id.clone(),
                None => return,
            }
        }
    };
    app.filters.set_filters(FilterPatch {
        rocket_id: Some(rocket_id),
        page: Some(1),
        ..Default::default()
    });
    app.selected_launch = None;
    spawn_launches_fetch(app, rt, false);
}

fn reload_paged_view(app: &mut App, rt: &Runtime) {
    match app.view {
        View::Launches => {
            app.selected_launch = None;
            spawn_launches_fetch(app, rt, false);
        }
        View::Starlink => {
            app.selected_sat = None;
            spawn_starlink_fetch(app, rt);
        }
        View::Dashboard => {}
    }
}

fn toggle_details(app: &mut App) {
    if app.view != View::Launches || app.focus == FocusArea::Sidebar {
        return;
    }
    if app.selected_launch.is_none() {
        let has_docs = app
            .launches
            .lock()
            .unwrap()
            .launches
            .as_ref()
            .map(|page| !page.docs.is_empty())
            .unwrap_or(false);
        if has_docs {
            app.selected_launch = Some(0);
        }
    }
    app.show_details = !app.show_details;
    if !app.show_details {
        app.focus = FocusArea::LaunchList;
        app.detail_scroll = 0;
    }
}

fn copy_selected_launch(app: &mut App) {
    if app.view != View::Launches {
        return;
    }
    let summary = {
        let panel = app.launches.lock().unwrap();
        app.selected_launch
            .and_then(|i| panel.launches.as_ref().and_then(|page| page.docs.get(i).cloned()))
            .map(|launch| launch.summary())
    };
    if let Some(summary) = summary {
        let mut clipboard = Clipboard::new().ok();
        if let Some(cb) = clipboard.as_mut() {
            let _ = cb.set_text(summary);
            app.status = Some("Launch details copied".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_index_clamps_to_the_list() {
        assert_eq!(step_index(None, 1, 0), None);
        assert_eq!(step_index(None, 1, 3), Some(0));
        assert_eq!(step_index(Some(0), -1, 3), Some(0));
        assert_eq!(step_index(Some(2), 1, 3), Some(2));
        assert_eq!(step_index(Some(1), 1, 3), Some(2));
    }

    #[test]
    fn views_cycle_in_tab_order() {
        assert_eq!(View::Dashboard.next(), View::Launches);
        assert_eq!(View::Launches.next(), View::Starlink);
        assert_eq!(View::Starlink.next(), View::Dashboard);
        assert_eq!(View::Dashboard.prev(), View::Starlink);
    }
}
