//! Delivery orders, visit windows and priorities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Minutes since midnight.
pub type Minutes = u32;

/// Length of a day in minutes.
pub const MINUTES_PER_DAY: Minutes = 1440;

/// A half-open interval `[start, end)` in minutes since midnight.
///
/// # Examples
/// ```
/// use tanker_core::TimeWindow;
///
/// let window = TimeWindow::new(420, 600);
/// assert!(window.contains(420));
/// assert!(!window.contains(600));
/// assert!(!window.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First minute at which service may begin.
    pub start: Minutes,
    /// Minute at which the window closes (exclusive).
    pub end: Minutes,
}

impl TimeWindow {
    /// Construct a window from its bounds.
    #[must_use]
    pub const fn new(start: Minutes, end: Minutes) -> Self {
        Self { start, end }
    }

    /// The whole day, `[0, 1440)`. Used for the depot.
    #[must_use]
    pub const fn full_day() -> Self {
        Self::new(0, MINUTES_PER_DAY)
    }

    /// Whether `minute` falls inside the window.
    #[must_use]
    pub const fn contains(&self, minute: Minutes) -> bool {
        self.start <= minute && minute < self.end
    }

    /// A window whose end does not follow its start admits no visit.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::full_day()
    }
}

/// A customer request for fuel at one destination.
///
/// Quantities are keyed by product name; the
/// [`ProductCatalog`](crate::ProductCatalog) maps products onto the vehicle
/// families that carry them. `priority` is the raw level from the request:
/// `1` is mandatory, anything higher may be dropped.
///
/// # Examples
/// ```
/// use tanker_core::{Order, TimeWindow};
///
/// let order = Order::new("A", "Station North", TimeWindow::new(420, 600))
///     .with_quantity("diesel", 50)
///     .with_priority(1);
/// assert_eq!(order.quantities.get("diesel"), Some(&50));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Caller-supplied identifier.
    pub id: String,
    /// Name of the destination location.
    pub destination: String,
    /// Requested quantity per product.
    #[serde(default)]
    pub quantities: BTreeMap<String, u32>,
    /// Visit window.
    #[serde(default)]
    pub window: TimeWindow,
    /// Priority level; `1` means the order must be served.
    #[serde(default = "default_priority")]
    pub priority: u8,
}

const fn default_priority() -> u8 {
    2
}

impl Order {
    /// Create an order with no quantities and the default droppable priority.
    pub fn new(id: impl Into<String>, destination: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            id: id.into(),
            destination: destination.into(),
            quantities: BTreeMap::new(),
            window,
            priority: default_priority(),
        }
    }

    /// Add or replace the requested quantity for `product`.
    #[must_use]
    pub fn with_quantity(mut self, product: impl Into<String>, quantity: u32) -> Self {
        self.quantities.insert(product.into(), quantity);
        self
    }

    /// Set the priority level.
    #[must_use]
    pub const fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }
}

/// Visit guarantee attached to a delivery.
///
/// Droppable deliveries carry the penalty the solver pays for leaving them
/// out; the weight shrinks as the level number grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Priority {
    /// The solver must visit the node.
    Mandatory,
    /// The solver may skip the node at a cost.
    Droppable {
        /// Level from the request (always at least 2).
        level: u8,
        /// Penalty paid when the node is left unvisited.
        penalty_weight: u64,
    },
}

impl Priority {
    /// Request level this priority was derived from.
    #[must_use]
    pub const fn level(&self) -> u8 {
        match self {
            Self::Mandatory => 1,
            Self::Droppable { level, .. } => *level,
        }
    }

    /// Whether the node must be visited.
    #[must_use]
    pub const fn is_mandatory(&self) -> bool {
        matches!(self, Self::Mandatory)
    }
}
