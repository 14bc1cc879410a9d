//! Page map of the SRT booking site and the KakaoPay payment window.
//!
//! Every URL, locator and marker string the hunter relies on lives here.
//! The site changes its markup without notice; when it does, this file
//! and [`super::parser`] are the only places to update.

// ============================================================================
// Imports
// ============================================================================

use crate::driver::By;

// ============================================================================
// URLs
// ============================================================================

/// Member login form.
pub const LOGIN_URL: &str = "https://etk.srail.kr/cmc/01/selectLoginForm.do?pageId=TK0701000000";

/// Landing page after a successful login.
pub const MAIN_URL: &str = "https://etk.srail.kr/main.do";

/// Schedule search form.
pub const SCHEDULE_URL: &str =
    "https://etk.srail.kr/hpg/hra/01/selectScheduleList.do?pageId=TK0101010000";

/// URL fragment of the reservation confirmation page reached after a claim.
pub const CONFIRM_URL_FRAGMENT: &str = "confirmReservationInfo";

// ============================================================================
// Markers
// ============================================================================

/// Texts shown when the claimed seat was taken by someone else.
pub const LOST_RACE_MARKERS: [&str; 2] = ["잔여석 없음", "좌석이 매진"];

/// Text of a sold-out class cell.
pub const SOLD_OUT_MARKER: &str = "매진";

/// Texts shown once the payment went through.
pub const COMPLETION_MARKERS: [&str; 4] = [
    "스마트티켓 발급이 완료되었습니다",
    "결제완료",
    "승인번호",
    "결제금액",
];

// ============================================================================
// Login form
// ============================================================================

/// Login page controls.
pub mod login {
    use super::By;

    /// Member number input.
    #[must_use]
    pub fn member_id() -> By {
        By::id("srchDvNm01")
    }

    /// Password input.
    #[must_use]
    pub fn password() -> By {
        By::id("hmpgPwdCphd01")
    }

    /// Login submit button.
    #[must_use]
    pub fn submit() -> By {
        By::css("input.submit.btn_pastel2.loginSubmit[type='submit']")
    }
}

// ============================================================================
// Schedule form
// ============================================================================

/// Schedule search form controls.
pub mod schedule {
    use super::By;

    const FORM: &str = "/html/body/div[1]/div[4]/div/div[2]/form/fieldset";

    /// Departure station input.
    #[must_use]
    pub fn departure() -> By {
        By::xpath(format!("{FORM}/div[1]/div/div/div[1]/input"))
    }

    /// Arrival station input.
    #[must_use]
    pub fn arrival() -> By {
        By::xpath(format!("{FORM}/div[1]/div/div/div[2]/input"))
    }

    /// Travel date dropdown, options labelled `YYYY/MM/DD(요일)`.
    #[must_use]
    pub fn date() -> By {
        By::css("select[name='dptDt']")
    }

    /// Departure hour dropdown, option values `HH0000`.
    #[must_use]
    pub fn hour() -> By {
        By::css("select[name='dptTm']")
    }

    /// Adult passenger count dropdown.
    #[must_use]
    pub fn passengers() -> By {
        By::css("select[name='psgInfoPerPrnb1']")
    }

    /// Search submit button.
    #[must_use]
    pub fn search() -> By {
        By::xpath(format!("{FORM}/div[2]/input"))
    }
}

// ============================================================================
// Checkout
// ============================================================================

/// Reservation confirmation and checkout controls.
pub mod checkout {
    use super::By;

    const PAYMENT_BLOCK: &str = "/html/body/div[1]/div[4]/div/div[2]/form/fieldset/div[11]";

    /// Name input of a companion seat (0-based).
    #[must_use]
    pub fn companion_name(index: usize) -> By {
        By::css(format!("input[name='psgNm{}']", index + 2))
    }

    /// "Proceed to payment" button on the confirmation page.
    #[must_use]
    pub fn payment() -> By {
        By::xpath("/html/body/div/div[4]/div/div[2]/form/fieldset/div[11]/a[1]")
    }

    /// Easy-payment tab.
    #[must_use]
    pub fn easy_pay_tab() -> By {
        By::id("chTab2")
    }

    /// KakaoPay radio button.
    #[must_use]
    pub fn kakao_pay() -> By {
        By::id("kakaoPay")
    }

    /// Smartphone ticket issuance option.
    #[must_use]
    pub fn smart_ticket() -> By {
        By::xpath(format!("{PAYMENT_BLOCK}/div[2]/ul/li[2]/a"))
    }

    /// "Pay and issue" button.
    #[must_use]
    pub fn submit() -> By {
        By::xpath(format!("{PAYMENT_BLOCK}/div[11]/input[2]"))
    }
}

// ============================================================================
// Payment window
// ============================================================================

/// KakaoPay window controls.
pub mod payment {
    use super::By;

    const FORM: &str = "/html/body/div[1]/main/div/div[2]/div/div[2]/form";

    /// "Pay via KakaoTalk" tab.
    #[must_use]
    pub fn messenger_tab() -> By {
        By::xpath("/html/body/div/main/div/div[1]/div[4]/span")
    }

    /// Phone number input.
    #[must_use]
    pub fn phone() -> By {
        By::xpath(format!("{FORM}/div[1]/div/div/span/input"))
    }

    /// Birth date input.
    #[must_use]
    pub fn birth_date() -> By {
        By::xpath(format!("{FORM}/div[2]/div/div/span/input"))
    }

    /// Payment request button.
    #[must_use]
    pub fn request() -> By {
        By::xpath(format!("{FORM}/button"))
    }
}

// ============================================================================
// Tests
// ============================================================================
