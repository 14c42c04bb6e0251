use crate::fakes::{FakeImageModel, MemoryChat, ScriptedGenerator, Sent};
use nanobanana::core::images::ImageEngine;
use nanobanana::core::prompt::{GuardPolicy, PromptComposer, PromptSynthesizer, SynthesisSettings};
use nanobanana::error::{PipelineError, PromptError};
use nanobanana::pipeline::{Pipeline, PipelineSettings, RunOptions};
use nanobanana::transport::channels::delivery::compose_text;
use nanobanana::transport::channels::{ChannelConnection, DeliveryEngine};
use std::sync::Arc;
use std::sync::atomic::Ordering;

const PROMPT: &str = "Editorial photo of a model in a black leather trench coat, rim lighting, rooftop at dusk.";

struct Harness {
    generator: Arc<ScriptedGenerator>,
    images: Arc<FakeImageModel>,
    chat: Arc<MemoryChat>,
    pipeline: Pipeline,
}

fn harness(texts: &[&str], batch_images: usize, guard: GuardPolicy) -> Harness {
    let generator = Arc::new(ScriptedGenerator::new(texts));
    let images = Arc::new(FakeImageModel::new(batch_images));
    let chat = Arc::new(MemoryChat::new());

    let synthesizer = PromptSynthesizer::new(
        generator.clone(),
        PromptComposer::default(),
        guard,
        SynthesisSettings::default(),
    );
    let connection = Arc::new(ChannelConnection::with_client(chat.clone()));
    let pipeline = Pipeline::new(
        synthesizer,
        ImageEngine::new(images.clone()),
        Some(Arc::new(DeliveryEngine::new(connection, "-100123"))),
        PipelineSettings::default(),
    );

    Harness {
        generator,
        images,
        chat,
        pipeline,
    }
}

#[tokio::test]
async fn preferred_and_stable_paths_fill_one_album() {
    let h = harness(&[PROMPT], 1, GuardPolicy::reference());

    let outcome = h.pipeline.run(&RunOptions::default()).await.unwrap();

    assert_eq!(outcome.images.len(), 2);
    assert_eq!(h.images.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.images.single_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.chat.sent(),
        vec![
            Sent::Upload("image_1.png".into()),
            Sent::Upload("image_2.png".into()),
            Sent::Album(2),
            Sent::Text(compose_text(PROMPT, None)),
        ]
    );
}

#[tokio::test]
async fn batch_result_is_truncated_to_requested_count() {
    let h = harness(&[PROMPT], 4, GuardPolicy::reference());

    let outcome = h.pipeline.run(&RunOptions::default()).await.unwrap();

    assert_eq!(outcome.images.len(), 2);
    assert_eq!(h.images.single_calls.load(Ordering::SeqCst), 0);
    assert!(h.chat.sent().contains(&Sent::Album(2)));
}

#[tokio::test]
async fn rejected_prompt_is_regenerated_once() {
    let h = harness(&["a nude figure study", PROMPT], 0, GuardPolicy::reference());

    let outcome = h.pipeline.run(&RunOptions::default()).await.unwrap();

    assert_eq!(outcome.prompt, PROMPT);
    assert_eq!(h.generator.runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn exhausted_regenerations_stop_the_pipeline() {
    let h = harness(&["nude", "still nude"], 0, GuardPolicy::reference());

    let err = h.pipeline.run(&RunOptions::default()).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Prompt(PromptError::GenerationFailed(ref reason)) if reason == "forbidden_keyword:nude"
    ));
    assert_eq!(h.images.single_calls.load(Ordering::SeqCst), 0);
    assert!(h.chat.sent().is_empty());
}

#[tokio::test]
async fn short_prompt_fails_strict_length_bound() {
    let short = "leather jacket, fifty characters of prompt text...";
    let h = harness(&[short], 0, GuardPolicy::strict());

    let err = h.pipeline.run(&RunOptions::default()).await.unwrap_err();

    assert!(err.to_string().contains("prompt_too_short"));
}

#[tokio::test]
async fn header_leads_the_prompt_message() {
    let h = harness(&[PROMPT], 0, GuardPolicy::reference());
    let header = "Nano Banana — smoke | model | count=1 | aspect=VERTICAL | format=png";

    h.pipeline
        .run(&RunOptions {
            count: Some(1),
            header: Some(header.into()),
            ..RunOptions::default()
        })
        .await
        .unwrap();

    let texts = h.chat.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with(&format!("{header}\n\nPrompt:\n")));
    assert!(h.chat.sent().contains(&Sent::Album(1)));
}

#[tokio::test]
async fn long_prompt_is_split_losslessly() {
    let long = "leather ".repeat(1125);
    let long = long.trim();
    let h = harness(&[long], 0, GuardPolicy::reference());

    h.pipeline
        .run(&RunOptions {
            count: Some(1),
            ..RunOptions::default()
        })
        .await
        .unwrap();

    let texts = h.chat.texts();
    assert_eq!(texts.len(), 3);
    assert!(texts.iter().all(|t| t.chars().count() <= 4096));
    assert_eq!(texts.concat(), compose_text(long, None));
}
