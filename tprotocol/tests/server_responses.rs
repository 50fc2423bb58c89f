use futures_util::StreamExt;
use tprotocol::{
    ChatCompletion, ChatCompletionChunk, ProtocolErrorKind, Role, VecChunkStream, extract_content,
};

const TOOL_CALL_RESPONSE: &str = r#"{
    "id": "cmpl-42",
    "model": "llama3.1",
    "choices": [{
        "index": 0,
        "message": {
            "role": "assistant",
            "tool_calls": [
                {"id": "call_a", "type": "function", "function": {"name": "square_root", "arguments": "{\"square\": 256}"}},
                {"id": "call_b", "type": "function", "function": {"name": "lookup", "arguments_obj": {"key": "x"}}}
            ]
        },
        "finish_reason": "tool_calls"
    }]
}"#;

const STREAMED_LINES: &[&str] = &[
    r#"{"id": "s1", "choices": [{"delta": {"role": "assistant"}}]}"#,
    r#"{"id": "s1", "choices": [{"delta": {"content": "The answer"}}]}"#,
    r#"{"id": "s1", "choices": [{"delta": {"content": null}}]}"#,
    r#"{"id": "s1", "choices": [{"delta": {"content": " is 16."}, "finish_reason": "stop"}]}"#,
];

#[test]
fn recorded_tool_call_response_decodes_both_argument_shapes() {
    let completion = ChatCompletion::from_json(TOOL_CALL_RESPONSE).expect("response should parse");
    let choice = completion.primary_choice().expect("one choice");
    let message = choice.message.as_ref().expect("assistant message");
    assert_eq!(message.role, Role::Assistant);

    let calls = completion.tool_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].id, "call_a");
    assert_eq!(
        calls[0].function.decode_arguments().expect("text arguments")["square"],
        256
    );
    assert_eq!(
        calls[1].function.decode_arguments().expect("object arguments")["key"],
        "x"
    );
}

#[tokio::test]
async fn recorded_stream_yields_text_in_arrival_order() {
    let chunks = STREAMED_LINES
        .iter()
        .map(|line| ChatCompletionChunk::from_json(line))
        .collect::<Vec<_>>();

    let pieces = extract_content(VecChunkStream::new(chunks))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("stream should be well formed");

    assert_eq!(pieces, vec!["The answer".to_string(), " is 16.".to_string()]);
    assert_eq!(pieces.concat(), "The answer is 16.");
}

#[tokio::test]
async fn truncated_stream_line_surfaces_a_decode_error() {
    let chunks = vec![
        ChatCompletionChunk::from_json(STREAMED_LINES[1]),
        ChatCompletionChunk::from_json(r#"{"choices": [{"delta": {"content": "oops"#),
    ];

    let mut text = extract_content(VecChunkStream::new(chunks));
    assert_eq!(
        text.next().await.expect("first piece").expect("valid chunk"),
        "The answer"
    );
    let error = text
        .next()
        .await
        .expect("error item")
        .expect_err("truncated json");
    assert_eq!(error.kind, ProtocolErrorKind::Decode);
    assert!(text.next().await.is_none());
}
