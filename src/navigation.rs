/// Screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Screen {
    Menu,
    Typing,
    Results,
    History,
}

/// Things the user (or the countdown) can do that may change the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartTest,
    Finish,
    Abort,
    Retry,
    OpenMenu,
    OpenHistory,
    Back,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Go(Screen),
    Stay,
    Quit,
}

const TRANSITIONS: &[(Screen, Action, Transition)] = &[
    (Screen::Menu, Action::StartTest, Transition::Go(Screen::Typing)),
    (Screen::Menu, Action::OpenHistory, Transition::Go(Screen::History)),
    (Screen::Menu, Action::Quit, Transition::Quit),
    (Screen::Typing, Action::Finish, Transition::Go(Screen::Results)),
    (Screen::Typing, Action::Abort, Transition::Go(Screen::Menu)),
    (Screen::Typing, Action::Quit, Transition::Quit),
    (Screen::Results, Action::Retry, Transition::Go(Screen::Typing)),
    (Screen::Results, Action::OpenMenu, Transition::Go(Screen::Menu)),
    (Screen::Results, Action::OpenHistory, Transition::Go(Screen::History)),
    (Screen::Results, Action::Quit, Transition::Quit),
    (Screen::History, Action::Back, Transition::Go(Screen::Menu)),
    (Screen::History, Action::OpenMenu, Transition::Go(Screen::Menu)),
    (Screen::History, Action::Quit, Transition::Quit),
];

impl Screen {
    /// Looks up where `action` leads from this screen. Actions with no entry
    /// leave the screen unchanged.
    pub fn next(self, action: Action) -> Transition {
        TRANSITIONS
            .iter()
            .find(|(from, on, _)| *from == self && *on == action)
            .map(|(_, _, to)| *to)
            .unwrap_or(Transition::Stay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_flow() {
        assert_eq!(
            Screen::Menu.next(Action::StartTest),
            Transition::Go(Screen::Typing)
        );
        assert_eq!(
            Screen::Typing.next(Action::Finish),
            Transition::Go(Screen::Results)
        );
        assert_eq!(
            Screen::Results.next(Action::Retry),
            Transition::Go(Screen::Typing)
        );
    }

    #[test]
    fn test_abort_returns_to_menu() {
        assert_eq!(
            Screen::Typing.next(Action::Abort),
            Transition::Go(Screen::Menu)
        );
    }

    #[test]
    fn test_history_reachable_and_back() {
        assert_eq!(
            Screen::Results.next(Action::OpenHistory),
            Transition::Go(Screen::History)
        );
        assert_eq!(
            Screen::History.next(Action::Back),
            Transition::Go(Screen::Menu)
        );
    }

    #[test]
    fn test_unknown_action_stays() {
        assert_eq!(Screen::Menu.next(Action::Finish), Transition::Stay);
        assert_eq!(Screen::History.next(Action::Retry), Transition::Stay);
        assert_eq!(Screen::Typing.next(Action::OpenHistory), Transition::Stay);
    }

    #[test]
    fn test_no_duplicate_entries() {
        for (i, (from, on, _)) in TRANSITIONS.iter().enumerate() {
            assert!(
                !TRANSITIONS[i + 1..]
                    .iter()
                    .any(|(f, o, _)| f == from && o == on),
                "duplicate transition {from} / {on:?}"
            );
        }
    }
}
