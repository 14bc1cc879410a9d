//! Shared test fixtures.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::booking::{
    CandidateTrain, ClassAvailability, SearchCriteria, SeatClass, TargetHour, TravelDate,
};
use crate::config::{Credentials, PaymentContact};
use crate::driver::scripted::{Effect, ScriptedDriver};
use crate::driver::{By, SelectBy};
use crate::identifiers::PageId;
use crate::site::pages::{self, checkout, login, payment, schedule};

// ============================================================================
// Domain fixtures
// ============================================================================

/// 수서 → 부산, 2026-10-20 from 08:00, 30 minutes, standard class, alone.
pub(crate) fn criteria() -> SearchCriteria {
    SearchCriteria {
        departure: "수서".into(),
        arrival: "부산".into(),
        date: TravelDate::parse("2026-10-20"),
        target_hour: TargetHour::new(8).unwrap(),
        tolerance_minutes: 30,
        seat_classes: BTreeSet::from([SeatClass::Standard]),
        passengers: 1,
        companions: Vec::new(),
    }
}

pub(crate) fn credentials() -> Credentials {
    Credentials {
        member_id: "1234567890".into(),
        password: "secret".into(),
    }
}

pub(crate) fn contact() -> PaymentContact {
    PaymentContact {
        phone: "01012345678".into(),
        birth_date: "900101".into(),
    }
}

/// A candidate with reserve actions for exactly the given classes.
pub(crate) fn train(row: usize, category: &str, departure: &str, open: &[SeatClass]) -> CandidateTrain {
    CandidateTrain {
        row,
        category: category.into(),
        number: format!("{}", 300 + row),
        departure: departure.parse().unwrap(),
        arrival: None,
        classes: SeatClass::PREFERENCE
            .into_iter()
            .map(|class| ClassAvailability {
                class,
                action: open
                    .contains(&class)
                    .then(|| By::xpath(format!("row{row}-{}", class.label()))),
            })
            .collect(),
    }
}

// ============================================================================
// Results page markup
// ============================================================================

/// Content of one class cell.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Cell {
    /// Reserve link followed by a seat-choice link.
    Reserve,
    /// Sold-out badge.
    SoldOut,
    /// Only a seat-choice link.
    SeatChoiceOnly,
    /// Seat-choice link first, spaced reserve label second.
    SeatChoiceThenReserve,
}

impl Cell {
    fn render(self) -> &'static str {
        match self {
            Self::Reserve => {
                "<a href=\"#\" class=\"btn_small btn_burgundy_dark\"><span>예약하기</span></a>\
                 <a href=\"#\" class=\"btn_small btn_midnight\"><span>좌석선택</span></a>"
            }
            Self::SoldOut => "<a href=\"#\" class=\"btn_small btn_silver\"><span>매진</span></a>",
            Self::SeatChoiceOnly => "<a href=\"#\"><span>좌석선택</span></a>",
            Self::SeatChoiceThenReserve => {
                "<a href=\"#\"><span>좌석선택</span></a><a href=\"#\"><span>예약 하기</span></a>"
            }
        }
    }
}

/// Builder for a schedule results page.
#[derive(Debug, Default)]
pub(crate) struct ResultsTable {
    rows: Vec<String>,
}

impl ResultsTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn row(
        mut self,
        category: &str,
        number: &str,
        departure: &str,
        arrival: &str,
        premium: Cell,
        standard: Cell,
    ) -> Self {
        let index = self.rows.len() + 1;
        let mut tr = String::new();
        let _ = write!(
            tr,
            "<td>{index}</td>\
             <td>{category}\n<span class=\"tip\">직통</span></td>\
             <td>{number}</td>\
             <td><div>수서</div><em class=\"time\">{departure}</em></td>\
             <td><div>부산</div><em class=\"time\">{arrival}</em></td>\
             <td>{}</td>\
             <td>{}</td>\
             <td>-</td>",
            premium.render(),
            standard.render()
        );
        self.rows.push(tr);
        self
    }

    pub(crate) fn raw_row(mut self, cells: &str) -> Self {
        self.rows.push(cells.to_string());
        self
    }

    pub(crate) fn render(&self) -> String {
        let mut body = String::new();
        for row in &self.rows {
            let _ = write!(body, "<tr>{row}</tr>");
        }
        format!(
            "<html><body><div class=\"tbl_wrap\"><table>\
             <thead><tr><th>구분</th><th>열차종류</th><th>열차번호</th><th>출발역</th>\
             <th>도착역</th><th>특실</th><th>일반실</th><th>예약대기</th></tr></thead>\
             <tbody>{body}</tbody></table></div></body></html>"
        )
    }
}

// ============================================================================
// Scripted site
// ============================================================================

/// Confirmation page reached after a claim.
pub(crate) const CONFIRM_URL: &str =
    "https://etk.srail.kr/hpg/hra/02/confirmReservationInfo.do?pageId=TK0101030000";

/// Page id of the KakaoPay window.
pub(crate) const KAKAO_PAGE: &str = "kakaopay";

const KAKAO_URL: &str = "https://online-pay.kakao.com/mockup/bridge/pc/pg/one-time/payment/";

/// Confirmation page with the seat still held.
pub(crate) const CONFIRM_HELD: &str =
    "<html><body><h3>예약정보 확인</h3><p>결제 가능 시간 10분</p></body></html>";

/// Confirmation page after losing the seat.
pub(crate) const CONFIRM_LOST: &str =
    "<html><body><p>잔여석 없음</p></body></html>";

/// KakaoPay page while the member has not approved yet.
pub(crate) const PAYMENT_PENDING: &str =
    "<html><body><p>카카오톡으로 결제 요청 메시지를 보냈습니다</p></body></html>";

/// KakaoPay completion page.
pub(crate) const PAYMENT_DONE: &str = "<html><body><h2>결제완료</h2><table>\
    <tr><th>결제금액</th><td>59,800원</td></tr>\
    <tr><th>승인일시</th><td>2026.10.19 08:31:02</td></tr></table></body></html>";

/// Login page whose submit lands on the main page.
pub(crate) fn login_site() -> ScriptedDriver {
    let driver = ScriptedDriver::new("about:blank");
    install_login(&driver);
    driver
}

/// Schedule form offering a month of dates from 2026-10-19.
pub(crate) fn schedule_site() -> ScriptedDriver {
    let driver = ScriptedDriver::new(pages::MAIN_URL);
    install_schedule(&driver);
    driver
}

/// Results page where every search renders `results`, with all checkout
/// and payment controls present. Nothing is claimable until
/// [`claimable`] registers a reserve link.
pub(crate) fn booking_site(results: &str) -> ScriptedDriver {
    let driver = ScriptedDriver::new(pages::SCHEDULE_URL);
    install_booking(&driver, results);
    driver
}

/// The whole site, starting from a blank page.
pub(crate) fn full_site(results: &str) -> ScriptedDriver {
    let driver = ScriptedDriver::new("about:blank");
    install_login(&driver);
    install_schedule(&driver);
    install_booking(&driver, results);
    driver
}

fn install_login(driver: &ScriptedDriver) {
    driver.show_all([login::member_id(), login::password(), login::submit()]);
    driver.on_click(login::submit(), Effect::GoTo(pages::MAIN_URL.into()));
}

fn install_schedule(driver: &ScriptedDriver) {
    driver.show_all([
        schedule::departure(),
        schedule::arrival(),
        schedule::date(),
        schedule::hour(),
        schedule::passengers(),
        schedule::search(),
    ]);

    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    driver.set_options(
        schedule::date(),
        TravelDate::upcoming(today, 31)
            .into_iter()
            .map(|d| SelectBy::Label(d.label().to_string()))
            .collect(),
    );
    driver.set_options(
        schedule::hour(),
        TargetHour::grid()
            .into_iter()
            .map(|h| SelectBy::Value(h.option_value()))
            .collect(),
    );
    driver.set_options(
        schedule::passengers(),
        (1..=9).map(|n| SelectBy::Value(n.to_string())).collect(),
    );
}

fn install_booking(driver: &ScriptedDriver, results: &str) {
    driver.show(schedule::search());
    driver.on_click(schedule::search(), Effect::Source(results.to_string()));

    driver.show_all((0..8).map(checkout::companion_name));
    driver.show_all([
        checkout::payment(),
        checkout::easy_pay_tab(),
        checkout::kakao_pay(),
        checkout::smart_ticket(),
        checkout::submit(),
        payment::messenger_tab(),
        payment::phone(),
        payment::birth_date(),
        payment::request(),
    ]);
    driver.on_click(checkout::smart_ticket(), Effect::Dialog);
    driver.on_click(
        checkout::submit(),
        Effect::OpenPage(PageId::new(KAKAO_PAGE), KAKAO_URL.to_string()),
    );
}

/// Makes a reserve link lead to the confirmation page showing `confirm`.
pub(crate) fn claimable(driver: &ScriptedDriver, action: &By, confirm: &str) {
    driver.show(action.clone());
    driver.on_click(action.clone(), Effect::GoTo(CONFIRM_URL.to_string()));
    driver.on_click(action.clone(), Effect::Source(confirm.to_string()));
}

/// KakaoPay shows [`PAYMENT_DONE`] after `pending` unanswered checks.
pub(crate) fn payment_completes_after(driver: &ScriptedDriver, pending: usize) {
    let mut sources = vec![PAYMENT_PENDING.to_string(); pending];
    sources.push(PAYMENT_DONE.to_string());
    driver.on_click(
        checkout::submit(),
        Effect::PageSources(PageId::new(KAKAO_PAGE), sources),
    );
}

/// Single-row results page: SRT 305 at 08:20, standard class open.
pub(crate) fn one_train_results() -> (String, By) {
    let html = ResultsTable::new()
        .row("SRT", "305", "08:20", "10:51", Cell::SoldOut, Cell::Reserve)
        .render();
    (html, By::xpath("((//tbody/tr)[1]/td[7]//a)[1]"))
}
