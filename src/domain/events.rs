use crate::domain::catalog::{DimensionId, Item, LoadTicket};
use crate::domain::chart::LogRange;
use std::fmt::Debug;

/// Base trait for all domain events
pub trait DomainEvent: Debug + Clone {
    fn event_type(&self) -> &'static str;
    fn timestamp(&self) -> u64 {
        use crate::domain::logging::get_time_provider;
        get_time_provider().current_timestamp()
    }
}

/// Events raised by a chart
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// Tap or click-through on an item. `navigate` is set when the host
    /// should open the item's source rather than show details.
    ItemActivated { item: Item, navigate: bool },
    ViewportChanged { old_range: LogRange, new_range: LogRange },
    DatasetLoaded { dimension: DimensionId, item_count: usize, ticket: LoadTicket },
    StaleResponseDiscarded { ticket: LoadTicket, current: LoadTicket },
}

impl DomainEvent for ChartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ChartEvent::ItemActivated { .. } => "ItemActivated",
            ChartEvent::ViewportChanged { .. } => "ViewportChanged",
            ChartEvent::DatasetLoaded { .. } => "DatasetLoaded",
            ChartEvent::StaleResponseDiscarded { .. } => "StaleResponseDiscarded",
        }
    }
}

/// Event dispatcher for publishing events
pub trait EventDispatcher {
    fn publish_chart_event(&self, event: ChartEvent);
}

/// Simple in-memory event dispatcher
#[derive(Default)]
pub struct InMemoryEventDispatcher {
    chart_handlers: Vec<Box<dyn Fn(&ChartEvent)>>,
}

impl InMemoryEventDispatcher {
    pub fn new() -> Self {
        Self { chart_handlers: Vec::new() }
    }

    pub fn subscribe_to_chart_events<F>(&mut self, handler: F)
    where
        F: Fn(&ChartEvent) + 'static,
    {
        self.chart_handlers.push(Box::new(handler));
    }
}

impl EventDispatcher for InMemoryEventDispatcher {
    fn publish_chart_event(&self, event: ChartEvent) {
        for handler in &self.chart_handlers {
            handler(&event);
        }
    }
}
