use std::rc::Rc;

use gloo::timers::callback::Interval;
use julkvall_core::{
    CompletionRecord, GameKind, GameSession, GameType, LevelId, SessionStatus, TeamName,
    format_duration, puzzle, puzzle_count,
};
use yew::prelude::*;

use crate::routes::Route;
use crate::services::Services;
use crate::team::TeamForm;
use crate::utils::utc_now;

/// `m:ss.t` for the running puzzle clock.
fn format_tenths(tenths: u32) -> String {
    let secs = tenths / 10;
    format!("{}:{:02}.{}", secs / 60, secs % 60, tenths % 10)
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Join(String),
    Start,
    Tick,
    Done,
    Next,
}

#[derive(Properties, PartialEq)]
pub(crate) struct PuzzleProps {
    pub services: Rc<Services>,
    pub puzzle_id: LevelId,
    pub navigate: Callback<Route>,
}

pub(crate) struct PuzzleView {
    session: GameSession,
    team: Option<TeamName>,
    record: Option<CompletionRecord>,
    prev_tenths: u32,
    timer: Option<Interval>,
}

impl PuzzleView {
    fn new_session(puzzle_id: LevelId) -> GameSession {
        GameSession::new(GameKind::Puzzle { puzzle_id }, 1)
    }

    fn create_timer(ctx: &Context<Self>, interval_ms: u32) -> Interval {
        let link = ctx.link().clone();
        Interval::new(interval_ms, move || link.send_message(Msg::Tick))
    }

    fn start(&mut self, ctx: &Context<Self>) -> bool {
        let Some(team) = &self.team else {
            return false;
        };
        match self.session.start(team.as_str(), utc_now()) {
            Ok(()) => {
                self.prev_tenths = 0;
                self.timer = Some(Self::create_timer(ctx, self.session.kind().tick_interval_ms()));
                true
            }
            Err(err) => {
                log::debug!("puzzle not started: {}", err);
                false
            }
        }
    }

    fn done(&mut self, ctx: &Context<Self>) -> bool {
        let puzzle_id = ctx.props().puzzle_id;
        let services = &ctx.props().services;
        let finished = services.leaderboards.finish_session(&mut self.session, utc_now());
        match finished {
            Ok(record) => {
                self.timer = None;
                services.progress.mark_solved(GameType::Puzzles, puzzle_id);
                log::debug!("puzzle {} done in {}s", puzzle_id, record.duration_seconds);
                self.record = Some(record);
                true
            }
            Err(err) => {
                log::debug!("puzzle not finished: {}", err);
                false
            }
        }
    }
}

impl Component for PuzzleView {
    type Message = Msg;
    type Properties = PuzzleProps;

    fn create(ctx: &Context<Self>) -> Self {
        let services = &ctx.props().services;
        Self {
            session: Self::new_session(ctx.props().puzzle_id),
            team: services.team_name(),
            record: None,
            prev_tenths: 0,
            timer: None,
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().puzzle_id != old_props.puzzle_id {
            self.timer = None;
            self.record = None;
            self.session = Self::new_session(ctx.props().puzzle_id);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Join(raw) => match TeamName::parse(&raw) {
                Ok(team) => {
                    team.save(&ctx.props().services.storage);
                    self.team = Some(team);
                    true
                }
                Err(_) => false,
            },
            Start => self.start(ctx),
            Tick => {
                let now = utc_now();
                self.session.tick(now);
                let tenths = self.session.elapsed_tenths(now);
                if self.prev_tenths != tenths {
                    self.prev_tenths = tenths;
                    true
                } else {
                    false
                }
            }
            Done => self.done(ctx),
            Next => {
                ctx.props()
                    .navigate
                    .emit(Route::Puzzle(ctx.props().puzzle_id + 1));
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let puzzle_id = ctx.props().puzzle_id;
        let Some(puzzle) = puzzle(puzzle_id) else {
            return html! { <p class="loading">{"🎄 Laddar..."}</p> };
        };

        let Some(team) = &self.team else {
            return html! {
                <main class="puzzle join">
                    <h1>{"Ange Lagnamn"}</h1>
                    <TeamForm action="Gå med i spelet" on_submit={ctx.link().callback(Join)}/>
                </main>
            };
        };

        let status = self.session.status();
        let clock = format_tenths(self.session.elapsed_tenths(utc_now()));
        let has_next = puzzle_id < puzzle_count()
            && ctx
                .props()
                .services
                .progress
                .get(GameType::Puzzles)
                .is_unlocked(puzzle_id + 1);
        let stage = match status {
            SessionStatus::Lobby => "lobby",
            SessionStatus::Active => "active",
            SessionStatus::Finished => "finished",
        };

        html! {
            <main class={classes!("puzzle", stage)}>
                <header>
                    <div>
                        <h1>{format!("Pussel #{}", puzzle_id)}</h1>
                        <p>{puzzle.title}</p>
                    </div>
                    <aside>
                        <small>{"Lag"}</small>
                        <strong>{team.as_str()}</strong>
                        if status.is_active() {
                            <time>{clock}</time>
                        }
                    </aside>
                </header>
                {
                    match status {
                        SessionStatus::Lobby => html! {
                            <section class="cover">
                                <h2>{format!("Pussel #{}", puzzle_id)}</h2>
                                <p>{"Tryck på knappen nedan för att starta"}</p>
                                <button onclick={ctx.link().callback(|_| Start)}>{"⏱️ Starta Tiden"}</button>
                            </section>
                        },
                        SessionStatus::Active => html! {
                            <section>
                                <p>{puzzle.problem}</p>
                                <img src={puzzle.problem_image} alt="Tändsticksproblem"/>
                                <button onclick={ctx.link().callback(|_| Done)}>{"KLART! 🔔"}</button>
                            </section>
                        },
                        SessionStatus::Finished => html! {
                            <section class="done">
                                <p>{"Klarmarkering registrerad!"}</p>
                                <p>{format!("Tid: {}", format_duration(self.record.as_ref().map_or(0, |r| r.duration_seconds)))}</p>
                                <img src={puzzle.solution_image} alt="Lösning"/>
                                if has_next {
                                    <button onclick={ctx.link().callback(|_| Next)}>{"Nästa Utmaning →"}</button>
                                }
                            </section>
                        },
                    }
                }
            </main>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_shows_tenths() {
        assert_eq!(format_tenths(0), "0:00.0");
        assert_eq!(format_tenths(125), "0:12.5");
        assert_eq!(format_tenths(6_019), "10:01.9");
    }
}
