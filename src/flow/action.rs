//! Typed callback tokens.
//!
//! Every inline button carries one of these, encoded with [`fmt::Display`] and
//! decoded once at the transport boundary with [`str::parse`]. Specialist ids
//! are always the last segment, so they may contain `_` or `:`.

use std::fmt;
use std::str::FromStr;

use crate::error::BotError;
use crate::utils::validation::parse_slot_time;

/// Offsets offered for urgent bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrgentDelay {
    Minutes15,
    Minutes60,
}

impl UrgentDelay {
    pub fn minutes(self) -> i64 {
        match self {
            UrgentDelay::Minutes15 => 15,
            UrgentDelay::Minutes60 => 60,
        }
    }

    fn from_minutes(minutes: &str) -> Option<Self> {
        match minutes {
            "15" => Some(UrgentDelay::Minutes15),
            "60" => Some(UrgentDelay::Minutes60),
            _ => None,
        }
    }
}

/// Buttons of the client booking flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    ChooseSpecialist,
    SelectSpecialist(String),
    Book(String),
    Urgent { delay: UrgentDelay, specialist_id: String },
    Schedule(String),
    SelectSlot { time: String, specialist_id: String },
    BackToStart,
    BackToList,
    BackToSpecialist(String),
    BackToTimeType(String),
    Restart,
}

/// Which field of a specialist an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialistField {
    Name,
    Description,
    Photo,
}

impl SpecialistField {
    fn as_str(self) -> &'static str {
        match self {
            SpecialistField::Name => "name",
            SpecialistField::Description => "desc",
            SpecialistField::Photo => "photo",
        }
    }
}

/// Admin booking list periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingPeriod {
    Today,
    Tomorrow,
    Week,
    Cancelled,
    All,
}

impl BookingPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingPeriod::Today => "today",
            BookingPeriod::Tomorrow => "tomorrow",
            BookingPeriod::Week => "week",
            BookingPeriod::Cancelled => "cancelled",
            BookingPeriod::All => "all",
        }
    }
}

impl FromStr for BookingPeriod {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(BookingPeriod::Today),
            "tomorrow" => Ok(BookingPeriod::Tomorrow),
            "week" => Ok(BookingPeriod::Week),
            "cancelled" => Ok(BookingPeriod::Cancelled),
            "all" => Ok(BookingPeriod::All),
            _ => Err(BotError::Validation(format!("unknown booking period '{s}'"))),
        }
    }
}

/// Buttons of the admin panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    Main,
    Close,
    CancelAction,
    Specialists,
    SpecialistList { show_all: bool },
    ViewSpecialist(String),
    AddSpecialist,
    SkipPhoto,
    EditSpecialist { field: SpecialistField, id: String },
    ToggleSpecialist(String),
    DeleteSpecialist(String),
    ConfirmDelete(String),
    Slots,
    ToggleSlot(i64),
    AddSlot,
    Bookings,
    BookingList(BookingPeriod),
    ViewBooking(i64),
    CancelBooking(i64),
    Stats,
}

/// A decoded callback token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Client(ClientAction),
    Admin(AdminAction),
    /// Decorative buttons; answered without doing anything.
    Ignore,
}

impl From<ClientAction> for Action {
    fn from(action: ClientAction) -> Self {
        Action::Client(action)
    }
}

impl From<AdminAction> for Action {
    fn from(action: AdminAction) -> Self {
        Action::Admin(action)
    }
}

impl fmt::Display for ClientAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientAction::ChooseSpecialist => write!(f, "choose_specialist"),
            ClientAction::SelectSpecialist(id) => write!(f, "spec_{id}"),
            ClientAction::Book(id) => write!(f, "book_{id}"),
            ClientAction::Urgent { delay, specialist_id } => {
                write!(f, "urgent_{}_{}", delay.minutes(), specialist_id)
            }
            ClientAction::Schedule(id) => write!(f, "schedule_{id}"),
            ClientAction::SelectSlot { time, specialist_id } => {
                write!(f, "slot_{}_{}", time.replace(':', "-"), specialist_id)
            }
            ClientAction::BackToStart => write!(f, "backstart"),
            ClientAction::BackToList => write!(f, "backlist"),
            ClientAction::BackToSpecialist(id) => write!(f, "backspec_{id}"),
            ClientAction::BackToTimeType(id) => write!(f, "backtime_{id}"),
            ClientAction::Restart => write!(f, "restart"),
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminAction::Main => write!(f, "admin:main"),
            AdminAction::Close => write!(f, "admin:close"),
            AdminAction::CancelAction => write!(f, "admin:cancel_action"),
            AdminAction::Specialists => write!(f, "admin:specialists"),
            AdminAction::SpecialistList { show_all } => {
                write!(f, "admin:spec:list:{}", u8::from(*show_all))
            }
            AdminAction::ViewSpecialist(id) => write!(f, "admin:spec:view:{id}"),
            AdminAction::AddSpecialist => write!(f, "admin:spec:add"),
            AdminAction::SkipPhoto => write!(f, "admin:spec:skip_photo"),
            AdminAction::EditSpecialist { field, id } => {
                write!(f, "admin:spec:edit:{}:{}", field.as_str(), id)
            }
            AdminAction::ToggleSpecialist(id) => write!(f, "admin:spec:toggle:{id}"),
            AdminAction::DeleteSpecialist(id) => write!(f, "admin:spec:delete:{id}"),
            AdminAction::ConfirmDelete(id) => write!(f, "admin:spec:confirm_delete:{id}"),
            AdminAction::Slots => write!(f, "admin:slots"),
            AdminAction::ToggleSlot(id) => write!(f, "admin:slot:toggle:{id}"),
            AdminAction::AddSlot => write!(f, "admin:slot:add"),
            AdminAction::Bookings => write!(f, "admin:bookings"),
            AdminAction::BookingList(period) => write!(f, "admin:bookings:{}", period.as_str()),
            AdminAction::ViewBooking(id) => write!(f, "admin:booking:view:{id}"),
            AdminAction::CancelBooking(id) => write!(f, "admin:booking:cancel:{id}"),
            AdminAction::Stats => write!(f, "admin:stats"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Client(action) => action.fmt(f),
            Action::Admin(action) => action.fmt(f),
            Action::Ignore => write!(f, "ignore"),
        }
    }
}

fn unknown(token: &str) -> BotError {
    BotError::Validation(format!("unknown action '{token}'"))
}

/// Non-empty trailing id segment.
fn id_segment(rest: &str, token: &str) -> Result<String, BotError> {
    if rest.is_empty() {
        Err(unknown(token))
    } else {
        Ok(rest.to_string())
    }
}

fn numeric_segment(rest: &str, token: &str) -> Result<i64, BotError> {
    rest.parse().map_err(|_| unknown(token))
}

impl FromStr for ClientAction {
    type Err = BotError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "choose_specialist" => return Ok(ClientAction::ChooseSpecialist),
            "backstart" => return Ok(ClientAction::BackToStart),
            "backlist" => return Ok(ClientAction::BackToList),
            "restart" => return Ok(ClientAction::Restart),
            _ => {}
        }

        if let Some(rest) = token.strip_prefix("spec_") {
            return Ok(ClientAction::SelectSpecialist(id_segment(rest, token)?));
        }
        if let Some(rest) = token.strip_prefix("book_") {
            return Ok(ClientAction::Book(id_segment(rest, token)?));
        }
        if let Some(rest) = token.strip_prefix("schedule_") {
            return Ok(ClientAction::Schedule(id_segment(rest, token)?));
        }
        if let Some(rest) = token.strip_prefix("backspec_") {
            return Ok(ClientAction::BackToSpecialist(id_segment(rest, token)?));
        }
        if let Some(rest) = token.strip_prefix("backtime_") {
            return Ok(ClientAction::BackToTimeType(id_segment(rest, token)?));
        }
        if let Some(rest) = token.strip_prefix("urgent_") {
            let (minutes, id) = rest.split_once('_').ok_or_else(|| unknown(token))?;
            let delay = UrgentDelay::from_minutes(minutes).ok_or_else(|| unknown(token))?;
            return Ok(ClientAction::Urgent {
                delay,
                specialist_id: id_segment(id, token)?,
            });
        }
        if let Some(rest) = token.strip_prefix("slot_") {
            let (time, id) = rest.split_once('_').ok_or_else(|| unknown(token))?;
            let time = parse_slot_time(&time.replace('-', ":"))?;
            return Ok(ClientAction::SelectSlot {
                time,
                specialist_id: id_segment(id, token)?,
            });
        }

        Err(unknown(token))
    }
}

impl FromStr for AdminAction {
    type Err = BotError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let body = token.strip_prefix("admin:").ok_or_else(|| unknown(token))?;

        let action = match body {
            "main" => AdminAction::Main,
            "close" => AdminAction::Close,
            "cancel_action" => AdminAction::CancelAction,
            "specialists" => AdminAction::Specialists,
            "spec:add" => AdminAction::AddSpecialist,
            "spec:skip_photo" => AdminAction::SkipPhoto,
            "slots" => AdminAction::Slots,
            "slot:add" => AdminAction::AddSlot,
            "bookings" => AdminAction::Bookings,
            "stats" => AdminAction::Stats,
            _ => return parse_admin_with_payload(body, token),
        };
        Ok(action)
    }
}

fn parse_admin_with_payload(body: &str, token: &str) -> Result<AdminAction, BotError> {
    if let Some(flag) = body.strip_prefix("spec:list:") {
        return match flag {
            "0" => Ok(AdminAction::SpecialistList { show_all: false }),
            "1" => Ok(AdminAction::SpecialistList { show_all: true }),
            _ => Err(unknown(token)),
        };
    }
    if let Some(rest) = body.strip_prefix("spec:view:") {
        return Ok(AdminAction::ViewSpecialist(id_segment(rest, token)?));
    }
    if let Some(rest) = body.strip_prefix("spec:edit:") {
        let (field, id) = rest.split_once(':').ok_or_else(|| unknown(token))?;
        let field = match field {
            "name" => SpecialistField::Name,
            "desc" => SpecialistField::Description,
            "photo" => SpecialistField::Photo,
            _ => return Err(unknown(token)),
        };
        return Ok(AdminAction::EditSpecialist {
            field,
            id: id_segment(id, token)?,
        });
    }
    if let Some(rest) = body.strip_prefix("spec:toggle:") {
        return Ok(AdminAction::ToggleSpecialist(id_segment(rest, token)?));
    }
    if let Some(rest) = body.strip_prefix("spec:delete:") {
        return Ok(AdminAction::DeleteSpecialist(id_segment(rest, token)?));
    }
    if let Some(rest) = body.strip_prefix("spec:confirm_delete:") {
        return Ok(AdminAction::ConfirmDelete(id_segment(rest, token)?));
    }
    if let Some(rest) = body.strip_prefix("slot:toggle:") {
        return Ok(AdminAction::ToggleSlot(numeric_segment(rest, token)?));
    }
    if let Some(rest) = body.strip_prefix("bookings:") {
        return Ok(AdminAction::BookingList(rest.parse()?));
    }
    if let Some(rest) = body.strip_prefix("booking:view:") {
        return Ok(AdminAction::ViewBooking(numeric_segment(rest, token)?));
    }
    if let Some(rest) = body.strip_prefix("booking:cancel:") {
        return Ok(AdminAction::CancelBooking(numeric_segment(rest, token)?));
    }

    Err(unknown(token))
}

impl FromStr for Action {
    type Err = BotError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token == "ignore" {
            Ok(Action::Ignore)
        } else if token.starts_with("admin:") {
            token.parse().map(Action::Admin)
        } else {
            token.parse().map(Action::Client)
        }
    }
}
