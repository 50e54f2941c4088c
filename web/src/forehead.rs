use std::rc::Rc;

use gloo::timers::callback::{Interval, Timeout};
use julkvall_core::{
    DEFAULT_DECK_SIZE, Direction, FOREHEAD_BUDGET_SECS, GameKind, GameSession, SessionStatus, TickOutcome,
    WordDeckEntry,
};
use yew::prelude::*;

use crate::routes::Route;
use crate::services::Services;
use crate::utils::{js_rng, utc_now};

/// Forehead rounds have no leaderboard, the session still wants a name.
const DEFAULT_TEAM: &str = "Pannband";
const FLASH_MS: u32 = 200;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Start,
    DeckLoaded(Vec<WordDeckEntry>),
    Tick,
    NextWord,
    FlashOff,
    Home,
}

#[derive(Properties, PartialEq)]
pub(crate) struct ForeheadProps {
    pub services: Rc<Services>,
    pub navigate: Callback<Route>,
}

pub(crate) struct ForeheadView {
    session: GameSession,
    deck: Vec<WordDeckEntry>,
    loading: bool,
    flash: Option<Timeout>,
    timer: Option<Interval>,
}

impl ForeheadView {
    fn create_timer(ctx: &Context<Self>, interval_ms: u32) -> Interval {
        let link = ctx.link().clone();
        Interval::new(interval_ms, move || link.send_message(Msg::Tick))
    }

    fn current_word(&self) -> Option<&WordDeckEntry> {
        self.deck.get(self.session.current_index())
    }

    fn deal(&mut self, ctx: &Context<Self>, deck: Vec<WordDeckEntry>) -> bool {
        self.loading = false;
        if deck.is_empty() {
            log::warn!("No words to play with");
            return true;
        }

        let team = ctx
            .props()
            .services
            .team_name()
            .map_or_else(|| DEFAULT_TEAM.to_string(), |team| team.to_string());
        self.session = GameSession::new(GameKind::Forehead, deck.len());
        self.deck = deck;
        match self.session.start(&team, utc_now()) {
            Ok(()) => {
                self.timer = Some(Self::create_timer(ctx, self.session.kind().tick_interval_ms()));
            }
            Err(err) => log::error!("Could not start forehead round: {}", err),
        }
        true
    }

    fn next_word(&mut self, ctx: &Context<Self>) -> bool {
        if !self.session.status().is_active() {
            return false;
        }
        if let Some(entry) = self.current_word() {
            ctx.props().services.words.mark_shown(entry, utc_now());
        }
        match self.session.advance(Direction::Forward) {
            Ok(outcome) => {
                let link = ctx.link().clone();
                self.flash = Some(Timeout::new(FLASH_MS, move || link.send_message(Msg::FlashOff)));
                outcome.has_update()
            }
            Err(err) => {
                log::debug!("word not advanced: {}", err);
                false
            }
        }
    }
}

impl Component for ForeheadView {
    type Message = Msg;
    type Properties = ForeheadProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            session: GameSession::new(GameKind::Forehead, 0),
            deck: Vec::new(),
            loading: false,
            flash: None,
            timer: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Start => {
                if self.loading || self.session.status().is_active() {
                    return false;
                }
                self.loading = true;
                let services = ctx.props().services.clone();
                ctx.link().send_future(async move {
                    let mut rng = js_rng();
                    DeckLoaded(services.words.fetch_deck(DEFAULT_DECK_SIZE, &mut rng).await)
                });
                true
            }
            DeckLoaded(deck) => self.deal(ctx, deck),
            Tick => match self.session.tick(utc_now()) {
                TickOutcome::Expired => {
                    self.timer = None;
                    true
                }
                TickOutcome::Running => true,
                TickOutcome::Idle => false,
            },
            NextWord => self.next_word(ctx),
            FlashOff => self.flash.take().is_some(),
            Home => {
                ctx.props().navigate.emit(Route::Home);
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        if self.loading {
            return html! { <main class="forehead loading"><p>{"🎄 Hämtar ord..."}</p></main> };
        }

        let start = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            Start
        });
        let home = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            Home
        });

        match self.session.status() {
            SessionStatus::Lobby => html! {
                <main class="forehead lobby">
                    <h1>{"📱 Pannband"}</h1>
                    <p>{"Håll mobilen mot pannan. Dina lagkamrater förklarar ordet som visas!"}</p>
                    <p>{format!("{} sekunder per runda", FOREHEAD_BUDGET_SECS)}</p>
                    <button onclick={start}>{"Starta Rundan"}</button>
                    <button onclick={home}>{"← Tillbaka till menyn"}</button>
                </main>
            },
            SessionStatus::Active => {
                let word = self.current_word().map(|entry| entry.word.clone()).unwrap_or_default();
                let time_left = self.session.time_left().unwrap_or_default();
                html! {
                    <main class={classes!("forehead", "playing", self.flash.is_some().then_some("flash"))}
                        onclick={ctx.link().callback(|_| NextWord)}>
                        <time class={classes!((time_left <= 10).then_some("hurry"))}>{time_left}</time>
                        <h1>{word}</h1>
                        <small>{"Tryck för nästa"}</small>
                    </main>
                }
            }
            SessionStatus::Finished => html! {
                <main class="forehead finished">
                    <h1>{"⏰ Tiden är ute!"}</h1>
                    <button onclick={start}>{"Spela Igen"}</button>
                    <button onclick={home}>{"← Tillbaka till menyn"}</button>
                </main>
            },
        }
    }
}
