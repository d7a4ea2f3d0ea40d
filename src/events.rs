use std::fmt;

use tracing::warn;

/// Notifications raised by the simulation during a tick.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum GameEvent {
    FoodEaten,
    Death,
    /// The snake filled every cell; no food can be placed.
    BoardFilled,
}

impl GameEvent {
    /// Returns true for events that end the game.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Death | Self::BoardFilled)
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(GameEvent)>;

/// Synchronous publish/subscribe channel owned by the game driver.
///
/// Handlers run in subscription order, inside the `publish` call. The bus also
/// carries the game-over latch, which is set by the first terminal event and
/// only cleared by [`EventBus::begin_game`].
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(SubscriptionId, Handler)>,
    next_id: u64,
    game_over: bool,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.handlers.len())
            .field("game_over", &self.game_over)
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(GameEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Removes a handler. Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Delivers `event` to every handler.
    ///
    /// Terminal events are delivered at most once per game.
    pub fn publish(&mut self, event: GameEvent) {
        if event.is_terminal() && self.game_over {
            warn!(?event, "terminal event after game over dropped");
            return;
        }

        for (_, handler) in &mut self.handlers {
            handler(event);
        }

        if event.is_terminal() {
            self.game_over = true;
        }
    }

    #[must_use]
    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Clears the game-over latch for a freshly built game.
    pub fn begin_game(&mut self) {
        self.game_over = false;
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{EventBus, GameEvent};

    fn recorder(bus: &mut EventBus) -> Rc<RefCell<Vec<GameEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        bus.subscribe(move |event| sink.borrow_mut().push(event));
        log
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for label in ["score", "ui"] {
            let order = Rc::clone(&order);
            bus.subscribe(move |_| order.borrow_mut().push(label));
        }

        bus.publish(GameEvent::FoodEaten);

        assert_eq!(*order.borrow(), vec!["score", "ui"]);
    }

    #[test]
    fn unsubscribed_handlers_stop_receiving() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let id = bus.subscribe(move |_| *counter.borrow_mut() += 1);

        bus.publish(GameEvent::FoodEaten);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(GameEvent::FoodEaten);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn death_sets_the_game_over_latch_once() {
        let mut bus = EventBus::new();
        let log = recorder(&mut bus);

        assert!(!bus.game_over());
        bus.publish(GameEvent::Death);
        bus.publish(GameEvent::Death);

        assert!(bus.game_over());
        assert_eq!(*log.borrow(), vec![GameEvent::Death]);
    }

    #[test]
    fn begin_game_clears_the_latch() {
        let mut bus = EventBus::new();
        let log = recorder(&mut bus);
        bus.publish(GameEvent::BoardFilled);

        bus.begin_game();
        bus.publish(GameEvent::Death);

        assert!(bus.game_over());
        assert_eq!(
            *log.borrow(),
            vec![GameEvent::BoardFilled, GameEvent::Death]
        );
    }
}
