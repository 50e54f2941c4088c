use std::rc::Rc;

use gloo::timers::callback::Interval;
use julkvall_core::{
    CompletionRecord, Direction, EMOJI_QUIZ, GameKind, GameSession, GameType, SessionStatus, TeamName,
    format_duration,
};
use yew::prelude::*;

use crate::routes::Route;
use crate::services::Services;
use crate::team::TeamForm;
use crate::utils::utc_now;

/// The quiz counts as one level of the emoji progress.
const QUIZ_LEVEL: u32 = 1;

fn clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Start(String),
    Tick,
    Move(Direction),
    Finish,
    Home,
}

#[derive(Properties, PartialEq)]
pub(crate) struct EmojiQuizProps {
    pub services: Rc<Services>,
    pub navigate: Callback<Route>,
}

pub(crate) struct EmojiQuizView {
    session: GameSession,
    record: Option<CompletionRecord>,
    prev_time: u32,
    timer: Option<Interval>,
}

impl EmojiQuizView {
    fn create_timer(ctx: &Context<Self>, interval_ms: u32) -> Interval {
        let link = ctx.link().clone();
        Interval::new(interval_ms, move || link.send_message(Msg::Tick))
    }
}

impl Component for EmojiQuizView {
    type Message = Msg;
    type Properties = EmojiQuizProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            session: GameSession::new(GameKind::EmojiQuiz, EMOJI_QUIZ.len()),
            record: None,
            prev_time: 0,
            timer: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        let services = &ctx.props().services;
        match msg {
            Start(raw) => {
                if let Err(err) = self.session.start(&raw, utc_now()) {
                    log::debug!("quiz not started: {}", err);
                    return false;
                }
                if let Some(team) = self.session.team() {
                    team.save(&services.storage);
                }
                self.record = None;
                self.prev_time = 0;
                self.timer = Some(Self::create_timer(ctx, self.session.kind().tick_interval_ms()));
                true
            }
            Tick => {
                let now = utc_now();
                self.session.tick(now);
                let time = self.session.elapsed_secs(now);
                if self.prev_time != time {
                    self.prev_time = time;
                    true
                } else {
                    false
                }
            }
            Move(direction) => self
                .session
                .advance(direction)
                .is_ok_and(|outcome| outcome.has_update()),
            Finish => match services.leaderboards.finish_session(&mut self.session, utc_now()) {
                Ok(record) => {
                    self.timer = None;
                    services.progress.mark_solved(GameType::Emojis, QUIZ_LEVEL);
                    self.record = Some(record);
                    true
                }
                Err(err) => {
                    log::debug!("quiz not finished: {}", err);
                    false
                }
            },
            Home => {
                ctx.props().navigate.emit(Route::Home);
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        match self.session.status() {
            SessionStatus::Lobby => {
                let initial = ctx
                    .props()
                    .services
                    .team_name()
                    .map(|team| AttrValue::from(team.to_string()))
                    .unwrap_or_default();
                html! {
                    <main class="emojis lobby">
                        <h1>{"🎅 Julquiz: Emoji-utmaningen"}</h1>
                        <p>{format!("Gissa titlarna. {} frågor. Timer startar när du klickar på knappen!", EMOJI_QUIZ.len())}</p>
                        <TeamForm {initial} action="Starta Quiz 🔥" on_submit={ctx.link().callback(Start)}/>
                    </main>
                }
            }
            SessionStatus::Active => {
                let index = self.session.current_index();
                let Some(riddle) = EMOJI_QUIZ.get(index) else {
                    return html! {};
                };
                let team = self.session.team().map(TeamName::as_str).unwrap_or_default();
                html! {
                    <main class="emojis quiz">
                        <header>
                            <small>{format!("Fråga {} av {}", index + 1, EMOJI_QUIZ.len())}</small>
                            <strong>{team}</strong>
                            <time>{clock(self.session.elapsed_secs(utc_now()))}</time>
                        </header>
                        <p class="riddle">{riddle.emojis}</p>
                        <nav>
                            <button disabled={index == 0} onclick={ctx.link().callback(|_| Move(Direction::Back))}>{"← Föregående"}</button>
                            if self.session.is_last_item() {
                                <button onclick={ctx.link().callback(|_| Finish)}>{"Klar! 🏁"}</button>
                            } else {
                                <button onclick={ctx.link().callback(|_| Move(Direction::Forward))}>{"Nästa →"}</button>
                            }
                        </nav>
                    </main>
                }
            }
            SessionStatus::Finished => {
                let team = self.session.team().map(TeamName::as_str).unwrap_or_default();
                let duration = self.record.as_ref().map_or(0, |record| record.duration_seconds);
                html! {
                    <main class="emojis finished">
                        <h1>{format!("🏆 Bra jobbat, {}!", team)}</h1>
                        <p>{"Din Tid"}</p>
                        <time>{format_duration(duration)}</time>
                        <button onclick={ctx.link().callback(|_| Home)}>{"Tillbaka till start"}</button>
                    </main>
                }
            }
        }
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct EmojiSolutionsProps {
    pub navigate: Callback<Route>,
}

/// Host view with every answer.
#[function_component]
pub(crate) fn EmojiSolutions(props: &EmojiSolutionsProps) -> Html {
    let back = {
        let navigate = props.navigate.clone();
        Callback::from(move |_: MouseEvent| navigate.emit(Route::Home))
    };

    html! {
        <main class="emojis solutions">
            <h1>{"📜 Värdvy: Facit Julquiz"}</h1>
            <ol>
                {
                    for EMOJI_QUIZ.iter().map(|riddle| html! {
                        <li key={riddle.id}>
                            <span class="riddle">{riddle.emojis}</span>
                            <strong>{riddle.answer}</strong>
                            if let Some(description) = riddle.description {
                                <small>{description}</small>
                            }
                        </li>
                    })
                }
            </ol>
            <button onclick={back}>{"← Tillbaka till start"}</button>
        </main>
    }
}
