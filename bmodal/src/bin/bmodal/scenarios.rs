//! Scripted scenarios driven against the headless platform.

use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use bmodal::presets::NOTICE_TITLE;
use bmodal::{
    Action, BModalConfig, Color, ConfirmOptions, Loading, LoadingOptions, Overlay, OverlayHost,
};
use bmodal_core::{HeadlessPlatform, Platform, Rect};

use crate::args::Scenario;

/// Wall-clock pause between virtual status ticks in the loading scenario.
const TICK: Duration = Duration::from_millis(250);
const STATUS_TICKS: u32 = 4;

pub async fn run(scenario: Scenario, config: BModalConfig) -> Result<()> {
    let platform = Rc::new(HeadlessPlatform::new());
    let host = OverlayHost::new(platform.clone() as Rc<dyn Platform>, config);

    match scenario {
        Scenario::Confirm => confirm(&platform, &host)?,
        Scenario::Stack => stack(&platform, &host)?,
        Scenario::Loading => loading(&platform, &host).await?,
    }

    log::info!(
        "Finished {scenario}: {} timers, {} observers, {} listeners, {} dialogs left",
        platform.active_timers(),
        platform.active_observers(),
        platform.active_listeners(),
        platform.open_dialogs()
    );
    Ok(())
}

fn snapshot(host: &OverlayHost, label: &str) {
    let document = host.document();
    let doc = document.borrow();
    log::info!("{label}:\n{}", doc.to_html(doc.body()));
}

fn confirm(platform: &HeadlessPlatform, host: &Rc<OverlayHost>) -> Result<()> {
    let yes = Action::new("Yes")
        .with_color(Color::Success)
        .with_icon(bmodal::presets::CHECK_ICON)
        .on_click(|overlay| {
            log::info!("Receipt deleted");
            overlay.close();
        });
    let no = Action::new("No")
        .with_color(Color::Danger)
        .with_icon(bmodal::presets::XMARK_ICON);
    let overlay = Overlay::confirm(
        host,
        "Delete this receipt?",
        ConfirmOptions::default().with_actions([no, yes]),
    )?;
    snapshot(host, "Confirmation open");

    let footer = overlay
        .surface()
        .and_then(|surface| surface.footer)
        .context("confirmation has no footer")?;
    let answer = host
        .document()
        .borrow()
        .children(footer)
        .last()
        .copied()
        .context("confirmation has no buttons")?;
    platform.click(answer);
    snapshot(host, "After answering");
    Ok(())
}

fn stack(platform: &HeadlessPlatform, host: &Rc<OverlayHost>) -> Result<()> {
    let notices = [
        Overlay::info(host, "Three receipts imported", "Import")?,
        Overlay::warning(host, "One receipt has no category", NOTICE_TITLE)?,
        Overlay::danger(host, "Upload quota almost reached", "Quota")?,
    ];
    log_layers(host, &notices);
    snapshot(host, "Three notices open");

    let [_, middle, _] = &notices;
    middle.close();
    log_layers(host, &notices);

    // Escape is disabled by default; the notices close through their buttons.
    if !platform.press_escape() {
        log::info!("Escape ignored");
    }
    for notice in &notices {
        notice.close();
    }
    snapshot(host, "All closed");
    Ok(())
}

fn log_layers(host: &OverlayHost, overlays: &[Overlay]) {
    for overlay in overlays {
        match host.layer_of(overlay) {
            Some(layer) => log::info!("overlay {} at layer {layer}", overlay.id()),
            None => log::info!("overlay {} closed", overlay.id()),
        }
    }
}

async fn loading(platform: &HeadlessPlatform, host: &Rc<OverlayHost>) -> Result<()> {
    let target = {
        let document = host.document();
        let mut doc = document.borrow_mut();
        let target = doc.create_element("div");
        doc.add_class(target, "receipt-grid")?;
        let body = doc.body();
        doc.append_child(body, target)?;
        doc.set_bounding_rect(target, Rect::new(120.0, 40.0, 800.0, 400.0))?;
        target
    };

    let loading = Loading::element(
        host,
        target,
        LoadingOptions::default().with_title("Fetching receipts"),
    )?;
    snapshot(host, "Loading anchored");

    let period = host.config().status_interval();
    let mut ticks = tokio::time::interval(TICK);
    for _ in 0..STATUS_TICKS {
        ticks.tick().await;
        platform.advance(period);
        log::info!("Status: {}", loading.status_text());
    }

    platform.scroll_to(0.0, 300.0);
    platform.resize_element(target, Rect::new(120.0, 40.0, 600.0, 400.0))?;
    snapshot(host, "After scroll and resize");

    loading.close();
    snapshot(host, "Loading closed");
    Ok(())
}
