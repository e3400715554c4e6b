//! Shared markup and formatting helpers for the server-rendered pages.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, display, html};
use numfmt::{Formatter, Precision};
use time::Date;

use crate::Money;

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500 \
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

// Form styles
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

/// The HTML document shell shared by every page.
pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Tally" }
            }

            body class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)
            }
        }
    }
}

/// A card with a heading, used to frame the log-in form.
pub fn log_in_card(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            span class="flex items-center mb-6 text-2xl font-semibold text-gray-900 dark:text-white"
            {
                "Tally"
            }

            div class="w-full bg-white rounded-lg shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1 class="text-xl font-bold leading-tight tracking-tight text-gray-900 md:text-2xl dark:text-white"
                    {
                        (form_title)
                    }

                    (form)
                }
            }
        }
    }
}

pub fn username_input(username: &str) -> Markup {
    html! {
        div
        {
            label for="username" class=(FORM_LABEL_STYLE) { "Username" }

            input
                type="text"
                name="username"
                id="username"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autofocus
                value=(username);
        }
    }
}

pub fn password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="password" class=(FORM_LABEL_STYLE) { "Password" }

            input
                type="password"
                name="password"
                id="password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

/// A number input for a dollar amount, to the cent.
pub fn amount_input(id: &str, value: Option<Money>) -> Markup {
    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { "Amount" }

            input
                type="number"
                name="amount"
                id=(id)
                step="0.01"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=[value.map(display)];
        }
    }
}

/// A date picker that submits `YYYY-MM-DD`.
pub fn date_input(id: &str, name: &str, label: &str, value: Option<Date>) -> Markup {
    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { (label) }

            input
                type="date"
                name=(name)
                id=(id)
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=[value.map(display)];
        }
    }
}

/// A link with blue text for use in a <p> tag.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class=(LINK_STYLE) { (text) }
    )
}

/// Format `number` as dollars with two decimal places and thousands separators,
/// e.g. "-$1,234.50".
pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .ok()
            .map(|formatter| formatter.precision(Precision::Decimals(2)))
    });

    static NEGATIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .ok()
            .map(|formatter| formatter.precision(Precision::Decimals(2)))
    });

    let (Some(positive_fmt), Some(negative_fmt)) = (positive_fmt, negative_fmt) else {
        tracing::warn!("Could not create currency formatter, falling back to plain formatting");
        return if number < 0.0 {
            format!("-${:.2}", number.abs())
        } else {
            format!("${number:.2}")
        };
    };

    let mut formatted_string = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "$0.00".to_owned()
    };

    // numfmt drops trailing zeros, e.g. "12.30" is rendered as "12.3" and "12.00" as "12".
    match formatted_string.rfind('.') {
        Some(index) if formatted_string.len() - index == 2 => formatted_string.push('0'),
        None => formatted_string.push_str(".00"),
        _ => {}
    }

    formatted_string
}
