//! View builder: pure functions from settings / user input to Block Kit payloads.

use crate::{
    blocks::{Block, BlockElement, RichTextElement, RichTextSpan, SelectOption, TextObject, View},
    settings::Settings,
};

pub const HOME_CALLBACK_ID: &str = "home_page";
pub const HOME_NAVIGATION_ACTION: &str = "home_navigation";
pub const OPEN_REPORT_MODAL: &str = "open_report_modal";

pub const REPORT_CALLBACK_ID: &str = "submit_report";
pub const SEND_TO_BLOCK: &str = "send_to";
pub const SEND_TO_ACTION: &str = "send_to_select";
pub const REPORT_TEXT_BLOCK: &str = "report_text";
pub const REPORT_TEXT_ACTION: &str = "plain_text_input-action";

pub const REPORT_RECEIVED_TITLE: &str = "New Report Received";
pub const REPORT_SENT_TITLE: &str = "Report Sent";

const NO_DESTINATIONS_NOTICE: &str = "*No report destinations are configured yet.*\n\
Ask a workspace admin to add channels to the bot's settings file and restart it.";

/// App home tab: greeting, one "report anonymously" button, footer.
pub fn build_home_view() -> View {
    let report_box = Block::Actions {
        elements: vec![BlockElement::Button {
            text: TextObject::plain(":memo: Report Anonymously"),
            action_id: HOME_NAVIGATION_ACTION.to_string(),
            value: OPEN_REPORT_MODAL.to_string(),
        }],
    };
    let footer = Block::Context {
        elements: vec![TextObject::mrkdwn(
            "Anonymous Bot Made with :heart: by Anthony DeGarimore\n\
             Review the source code at https://github.com/Paso-Robles-Vacation-Rentals/Anonymous-Bot",
        )],
    };

    View::Home {
        callback_id: HOME_CALLBACK_ID.to_string(),
        blocks: vec![
            Block::Header {
                text: TextObject::plain("Hello!"),
            },
            Block::Divider,
            report_box,
            Block::Divider,
            footer,
        ],
    }
}

/// Report modal with a destination select and a multi-line text input.
///
/// With no destinations configured this degrades to a notice-only modal with
/// no submit button, so nothing can be submitted to a made-up channel.
pub fn build_report_form(settings: &Settings) -> View {
    let options: Vec<SelectOption> = settings
        .channels
        .iter()
        .map(|d| SelectOption {
            text: TextObject::plain(d.name.clone()),
            value: d.id.clone(),
        })
        .collect();

    let Some(placeholder) = options.first().map(|o| o.text.clone()) else {
        return report_modal(
            None,
            vec![Block::Section {
                text: TextObject::mrkdwn(NO_DESTINATIONS_NOTICE),
            }],
        );
    };

    let send_to = Block::Input {
        block_id: SEND_TO_BLOCK.to_string(),
        label: TextObject::plain("Send my report to:"),
        element: BlockElement::StaticSelect {
            action_id: SEND_TO_ACTION.to_string(),
            placeholder: Some(placeholder),
            options,
        },
    };
    let report_text = Block::Input {
        block_id: REPORT_TEXT_BLOCK.to_string(),
        label: TextObject::plain("Report"),
        element: BlockElement::PlainTextInput {
            action_id: REPORT_TEXT_ACTION.to_string(),
            multiline: true,
        },
    };

    report_modal(Some(TextObject::plain("Submit")), vec![send_to, report_text])
}

fn report_modal(submit: Option<TextObject>, blocks: Vec<Block>) -> View {
    View::Modal {
        callback_id: REPORT_CALLBACK_ID.to_string(),
        title: TextObject::plain("Report Anonymously"),
        submit,
        close: Some(TextObject::plain("Cancel")),
        blocks,
    }
}

/// Bold title line followed by the body as a block quote.
pub fn build_message_blocks(title: &str, body: &str) -> Vec<Block> {
    vec![Block::RichText {
        elements: vec![
            RichTextElement::RichTextSection {
                elements: vec![RichTextSpan::bold(title), RichTextSpan::text("\n")],
            },
            RichTextElement::RichTextQuote {
                elements: vec![RichTextSpan::text(body)],
            },
        ],
    }]
}
