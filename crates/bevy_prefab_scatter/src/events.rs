use std::collections::HashSet;

use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use prefab_scatter::prelude::{EventSink, ScatterEvent, ScatterEventKind};

/// Bevy message containing the scatter owner entity and the underlying [`ScatterEvent`].
#[derive(Message, Debug, Clone)]
pub struct ScatterMessage {
    pub owner: Entity,
    pub event: ScatterEvent,
}

/// Which event kinds are forwarded to the bus. `None` forwards everything.
#[derive(Debug, Clone, Default)]
pub struct ScatterEventFilter {
    pub kinds: Option<HashSet<ScatterEventKind>>,
}

impl ScatterEventFilter {
    pub fn all() -> Self {
        Self { kinds: None }
    }

    pub fn only(kinds: impl IntoIterator<Item = ScatterEventKind>) -> Self {
        Self {
            kinds: Some(kinds.into_iter().collect()),
        }
    }

    pub fn allows(&self, kind: ScatterEventKind) -> bool {
        self.kinds.as_ref().is_none_or(|k| k.contains(&kind))
    }
}

/// Bus configuration; replace the resource to change the filter.
#[derive(Resource, Debug, Clone)]
pub struct ScatterBusConfig {
    pub filter: ScatterEventFilter,
}

impl Default for ScatterBusConfig {
    fn default() -> Self {
        // Per-evaluation chatter is opt-in.
        Self {
            filter: ScatterEventFilter::only([
                ScatterEventKind::RebuildStarted,
                ScatterEventKind::ReconcileFinished,
                ScatterEventKind::ConsistencyError,
                ScatterEventKind::OrphanRootsSwept,
                ScatterEventKind::Warning,
            ]),
        }
    }
}

/// Global bus collecting scatter events until they are drained into [`Messages`].
#[derive(Resource)]
pub struct ScatterBus {
    pub tx: Sender<ScatterMessage>,
    pub rx: Receiver<ScatterMessage>,
}

impl Default for ScatterBus {
    fn default() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }
}

impl ScatterBus {
    pub fn sender(&self) -> &Sender<ScatterMessage> {
        &self.tx
    }

    pub fn receiver(&self) -> &Receiver<ScatterMessage> {
        &self.rx
    }
}

/// Event sink that forwards events to the global scatter bus, tagging each event with the owner entity.
pub struct ChannelSink {
    pub owner: Entity,
    pub tx: Sender<ScatterMessage>,
    pub filter: ScatterEventFilter,
}

impl EventSink for ChannelSink {
    #[inline]
    fn send(&mut self, event: ScatterEvent) {
        let _ = self.tx.send(ScatterMessage {
            owner: self.owner,
            event,
        });
    }

    #[inline]
    fn wants(&self, kind: ScatterEventKind) -> bool {
        self.filter.allows(kind)
    }
}
