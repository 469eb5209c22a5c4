use super::Notice;
use super::Phase;
use super::ToolName;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Anchor {
    Loader,
    Results,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    CreditsUpdated(i64),
    Loading(bool),
    Notice(Notice),
    Paywall(i64),
    PhaseChanged(Phase),
    ResultReady(ToolName),
    ScrollTo(Anchor),
}
