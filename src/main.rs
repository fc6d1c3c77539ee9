mod config;
mod quiz;

use std::sync::Arc;

use config::Config;
use dotenv::dotenv;
use log::{debug, error, info};
use quiz::{
    advance::AdvanceTimers,
    bank::{self, ImageSource},
    Difficulty, Phase, QuestionView, QuizEngine, QuizError, EASY_SELECTOR, HARD_SELECTOR,
};
use teloxide::{
    dispatching::dialogue::{ErasedStorage, InMemStorage, Storage},
    prelude::*,
    types::{InputFile, KeyboardButton, KeyboardMarkup, KeyboardRemove},
    utils::command::BotCommands,
};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type QuizStorage = Arc<ErasedStorage<State>>;
type Timers = Arc<AdvanceTimers<ChatId>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveDifficulty,
    Quiz {
        engine: QuizEngine,
    },
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
enum Command {
    #[command(description = "choose a difficulty and start a new quiz.")]
    Start,
    #[command(description = "finish the quiz and show your score.")]
    End,
    #[command(description = "show this text.")]
    Help,
}

#[tokio::main]
async fn main() {
    // .env is optional, the variables may come from the environment
    dotenv().ok();

    pretty_env_logger::init();
    log::info!("Starting logo quiz bot...");

    let config = Arc::new(Config::from_env().expect("Invalid quiz configuration"));
    info!(
        "Question bank: {}, advance delay: {:?}",
        config.bank_path.display(),
        config.advance_delay
    );

    let bot = Bot::from_env();
    if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Failed to register bot commands: {}", err);
    }

    // Scores only live as long as the process
    let storage: QuizStorage = InMemStorage::<State>::new().erase();
    let timers: Timers = Arc::new(AdvanceTimers::new());

    let handler = Update::filter_message()
        .enter_dialogue::<Message, ErasedStorage<State>, State>()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(receive_command),
        )
        .branch(dptree::case![State::Start].endpoint(start))
        .branch(dptree::case![State::ReceiveDifficulty].endpoint(receive_difficulty))
        .branch(dptree::case![State::Quiz { engine }].endpoint(receive_answer));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![storage, config, timers])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

const GREETING_TEXT: &str =
    "Hi! I'm the car logo quiz. I'll show you a logo and you name the brand. Send /end at any time to see your score.";
async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;
    prompt_difficulty(&bot, msg.chat.id).await?;

    dialogue.update(State::ReceiveDifficulty).await?;
    Ok(())
}

fn is_new_chat(state: &Option<State>) -> bool {
    matches!(state, None | Some(State::Start))
}

async fn prompt_difficulty(bot: &Bot, chat_id: ChatId) -> HandlerResult {
    let keyboard = KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(EASY_SELECTOR),
        KeyboardButton::new(HARD_SELECTOR),
    ]]);
    bot.send_message(chat_id, "Choose a difficulty:")
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

async fn receive_command(
    bot: Bot,
    dialogue: QuizDialogue,
    timers: Timers,
    cmd: Command,
    msg: Message,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    match cmd {
        Command::Start => {
            timers.cancel(&chat_id);
            if is_new_chat(&dialogue.get().await?) {
                bot.send_message(chat_id, GREETING_TEXT).await?;
            }
            prompt_difficulty(&bot, chat_id).await?;
            dialogue.update(State::ReceiveDifficulty).await?;
        }
        Command::End => {
            timers.cancel(&chat_id);
            match dialogue.get().await? {
                Some(State::Quiz { mut engine }) => {
                    let summary = engine.end_quiz();
                    info!("Chat {} finished a quiz: {}", chat_id, summary);

                    bot.send_message(chat_id, summary.to_string())
                        .reply_markup(KeyboardRemove::new())
                        .await?;
                    prompt_difficulty(&bot, chat_id).await?;
                    dialogue.update(State::ReceiveDifficulty).await?;
                }
                _ => {
                    bot.send_message(chat_id, "There is no quiz in progress. Send /start to begin.")
                        .await?;
                }
            }
        }
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string())
                .await?;
        }
    }
    Ok(())
}

async fn receive_difficulty(
    bot: Bot,
    dialogue: QuizDialogue,
    config: Arc<Config>,
    msg: Message,
) -> HandlerResult {
    let difficulty = match msg.text() {
        Some(value @ (EASY_SELECTOR | HARD_SELECTOR)) => Difficulty::from_selector(value),
        _ => {
            bot.send_message(msg.chat.id, "Please pick one of the difficulties")
                .await?;
            return Ok(());
        }
    };

    // The bank is re-read on every start so edits show up without a restart
    let bank = match bank::load_bank(&config.bank_path).await {
        Ok(bank) => bank,
        Err(err) => {
            error!("Failed to load the question bank: {}", err);
            return Ok(());
        }
    };

    let mut engine = QuizEngine::new();
    let started = engine.start(bank, difficulty, &mut rand::thread_rng());
    let view = match started {
        Ok(view) => view,
        Err(err) => {
            error!("Failed to start a quiz: {}", err);
            return Ok(());
        }
    };
    info!(
        "Chat {} started a {:?} quiz over {} logos",
        msg.chat.id,
        engine.difficulty(),
        engine.bank_len()
    );

    // Only a logo the user has actually seen can be answered
    send_question(&bot, msg.chat.id, &config, &view).await?;
    dialogue.update(State::Quiz { engine }).await?;
    Ok(())
}

async fn receive_answer(
    bot: Bot,
    dialogue: QuizDialogue,
    config: Arc<Config>,
    timers: Timers,
    mut engine: QuizEngine,
    msg: Message,
) -> HandlerResult {
    let chat_id = msg.chat.id;

    // In choice mode anything but one of the offered options counts as no selection
    let input = engine.resolve_input(msg.text()).map(str::to_string);
    let result = match engine.check_answer(input.as_deref()) {
        Ok(result) => result,
        Err(QuizError::AnswerPending) => {
            debug!("Chat {} answered before the next question was shown", chat_id);
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    debug!(
        "Chat {} answered {:?} (expected {:?}): correct = {}, {}",
        chat_id,
        input,
        engine.correct_answer(),
        result.is_correct,
        engine.summary()
    );

    dialogue.update(State::Quiz { engine }).await?;

    let hint = if result.is_correct { "✅" } else { "❌" };
    bot.send_message(chat_id, format!("{} {}", hint, result.message))
        .await?;

    let delay = config.advance_delay;
    timers.schedule(chat_id, delay, async move {
        if let Err(err) = advance(bot, dialogue, config).await {
            error!("Failed to show the next question in chat {}: {}", chat_id, err);
        }
    });
    Ok(())
}

/// Shows the next logo once the previous result has been on screen long enough.
async fn advance(bot: Bot, dialogue: QuizDialogue, config: Arc<Config>) -> HandlerResult {
    let chat_id = dialogue.chat_id();
    let state = dialogue.get().await?;
    let next = prepare_next(state, &mut rand::thread_rng())?;
    let Some((engine, view)) = next else {
        return Ok(());
    };
    debug!("Chat {} moves on to logo #{}", chat_id, engine.current_index());

    // The stored engine keeps waiting for the advance until the logo is really out
    if let Err(err) = send_question(&bot, chat_id, &config, &view).await {
        error!("Failed to send logo {:?} to chat {}: {}", view.image_ref, chat_id, err);
        bot.send_message(chat_id, "Could not show the next logo. Send /start to begin again.")
            .await?;
        return Ok(());
    }
    dialogue.update(State::Quiz { engine }).await?;
    Ok(())
}

/// The engine with its next question prepared, if the chat is still waiting for one.
///
/// The quiz may have been ended or restarted while the advance was pending.
fn prepare_next<R: rand::Rng + ?Sized>(
    state: Option<State>,
    rng: &mut R,
) -> Result<Option<(QuizEngine, QuestionView)>, QuizError> {
    let Some(State::Quiz { mut engine }) = state else {
        return Ok(None);
    };
    if engine.phase() != Phase::Advancing {
        return Ok(None);
    }

    let view = engine.next_question(rng)?;
    Ok(Some((engine, view)))
}

async fn send_question(
    bot: &Bot,
    chat_id: ChatId,
    config: &Config,
    view: &QuestionView,
) -> HandlerResult {
    let photo = match bank::resolve_image(config.bank_dir(), &view.image_ref) {
        ImageSource::Url(url) => InputFile::url(url),
        ImageSource::File(path) => InputFile::file(path),
    };

    match view.options() {
        Some(options) => {
            let keyboard = KeyboardMarkup::new(
                options
                    .iter()
                    .map(|option| vec![KeyboardButton::new(option.clone())])
                    .collect::<Vec<_>>(),
            );
            bot.send_photo(chat_id, photo)
                .caption("Which brand is this?")
                .reply_markup(keyboard)
                .await?;
        }
        None => {
            bot.send_photo(chat_id, photo)
                .caption("Type your answer:")
                .reply_markup(KeyboardRemove::new())
                .await?;
        }
    }
    Ok(())
}
