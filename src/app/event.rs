//! Event plumbing.
//!
//! Terminal input is wrapped into [`AppEvent`] by a background task, and the
//! fetch controller's published state is forwarded as [`ViewChange`]
//! messages.  Both arrive over channels so the main loop stays non-blocking.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;

use crate::core::{
    fetch::FetchController, observable::SubscriptionId, schema::ViewDocument, status::Status,
};

/// High-level terminal events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Paste(String),
    Resize,
    Tick,
}

/// Spawns a background task that polls the terminal for events and sends them
/// through the returned channel.
pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            // Poll with the tick rate so the fetch spinner keeps moving.
            let has_event = event::poll(tick_rate).unwrap_or(false);
            let app_event = if has_event {
                match event::read() {
                    Ok(CtEvent::Key(k)) if k.kind != KeyEventKind::Release => AppEvent::Key(k),
                    Ok(CtEvent::Mouse(m)) => AppEvent::Mouse(m),
                    Ok(CtEvent::Paste(text)) => AppEvent::Paste(text),
                    Ok(CtEvent::Resize(..)) => AppEvent::Resize,
                    _ => continue,
                }
            } else {
                AppEvent::Tick
            };
            if tx.send(app_event).is_err() {
                break; // receiver dropped
            }
        }
    });

    rx
}

/// A published-state change from the fetch controller.
#[derive(Debug, Clone)]
pub enum ViewChange {
    Document(ViewDocument),
    Status(Status),
}

/// The two subscriptions behind a [`bind_controller`] channel.
#[derive(Debug)]
pub struct ControllerBinding {
    document: SubscriptionId,
    status: SubscriptionId,
}

impl ControllerBinding {
    /// Drop both subscriptions.  Once they are gone the channel closes.
    pub fn release(self, controller: &mut FetchController) {
        controller.unsubscribe_document(self.document);
        controller.unsubscribe_status(self.status);
    }
}

/// Subscribe to the controller's document and status, forwarding every
/// change into the returned channel.  The current values are delivered
/// first.
pub fn bind_controller(
    controller: &mut FetchController,
) -> (ControllerBinding, mpsc::UnboundedReceiver<ViewChange>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let doc_tx = tx.clone();
    let document = controller.subscribe_document(move |doc| {
        let _ = doc_tx.send(ViewChange::Document(doc.clone()));
    });
    let status = controller.subscribe_status(move |status| {
        let _ = tx.send(ViewChange::Status(*status));
    });

    (ControllerBinding { document, status }, rx)
}
