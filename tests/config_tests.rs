use serde_json::{json, Map, Value};
use tokio_test::{assert_err, assert_ok};

use neural_chatgpt::config::{
  load_config, ProviderConfig, API_BASE_VAR, CONNECT_TIMEOUT_VAR,
  DEFAULT_API_BASE
};
use neural_chatgpt::request::ChatCompletionRequest;
use neural_chatgpt::Error;

fn valid_config() -> Value
{   json!({
      "api_key": ".",
      "model": "foo",
      "prompt": "say hello",
      "temperature": 1,
      "top_p": 1,
      "max_tokens": 1,
      "presence_penalty": 1,
      "frequency_penalty": 1
    })
}

fn config_error(raw: &Value) -> String
{   match load_config(raw)
    {   Err(Error::InvalidConfiguration(msg)) => msg
      , other => panic!("expected config error, got {:?}", other)
    }
}

#[test]
fn test_non_mapping_config_is_rejected()
{   for raw in [json!(0), json!(null), json!("x"), json!([1, 2])]
    {   assert_eq!(
          config_error(&raw),
          "chatgpt config is not a dictionary"
        );
    }
}

#[test]
fn test_checks_run_in_order()
{   let steps: Vec<(Value, &str)> = vec![
      (json!({}), "chatgpt.api_key is not defined")
    , (json!({"api_key": ""}), "chatgpt.api_key is not defined")
    , (json!({"api_key": "."}), "chatgpt.model is not defined")
    , (json!({"model": ""}), "chatgpt.model is not defined")
    , (json!({"model": "x", "temperature": "x"}),
        "chatgpt.temperature is invalid")
    , (json!({"temperature": 1, "top_p": "x"}),
        "chatgpt.top_p is invalid")
    , (json!({"top_p": 1, "max_tokens": "x"}),
        "chatgpt.max_tokens is invalid")
    , (json!({"max_tokens": 1, "presence_penalty": "x"}),
        "chatgpt.presence_penalty is invalid")
    , (json!({"presence_penalty": 1, "frequency_penalty": "x"}),
        "chatgpt.frequency_penalty is invalid")
    ];

    let mut config = Map::new();
    for (modification, expected) in steps
    {   if let Value::Object(fields) = modification
        {   config.extend(fields);
        }
        let raw = Value::Object(config.clone());
        assert_eq!(config_error(&raw), expected, "{}", raw);
    }

    config.insert("frequency_penalty".to_string(), json!(0.5));
    assert_ok!(load_config(&Value::Object(config)));
}

#[test]
fn test_missing_api_key_wins_over_other_errors()
{   let raw = json!({
      "model": "",
      "temperature": "hot",
      "top_p": []
    });
    assert_eq!(config_error(&raw), "chatgpt.api_key is not defined");

    let raw = json!({"api_key": 42, "model": "foo"});
    assert_eq!(config_error(&raw), "chatgpt.api_key is not defined");
}

#[test]
fn test_booleans_are_not_numeric()
{   let raw = json!({"api_key": "k", "model": "m", "top_p": true});
    assert_eq!(config_error(&raw), "chatgpt.top_p is invalid");
}

#[test]
fn test_valid_config_keeps_only_supplied_fields()
{   let config = assert_ok!(load_config(&json!({
      "api_key": "sk-test",
      "model": "gpt-3.5-turbo",
      "temperature": 0.2,
      "max_tokens": 64,
      "top_p": null
    })));

    assert_eq!(config.api_key, "sk-test");
    assert_eq!(config.model, "gpt-3.5-turbo");
    assert!(config.top_p.is_none());
    assert!(config.presence_penalty.is_none());
    assert!(config.frequency_penalty.is_none());

    let body = serde_json::to_value(
      ChatCompletionRequest::streaming(&config, "hi")
    ).unwrap();
    assert_eq!(body, json!({
      "model": "gpt-3.5-turbo",
      "messages": [{"role": "user", "content": "hi"}],
      "temperature": 0.2,
      "max_tokens": 64,
      "stream": true
    }));
}

#[test]
fn test_debug_output_hides_api_key()
{   let config = assert_ok!(load_config(&valid_config()));
    let printed = format!("{:?}", config);
    assert!(printed.contains("foo"));
    assert!(!printed.contains("api_key: \".\""));
    assert!(printed.contains("<redacted>"));
}

#[test]
fn test_invalid_configuration_displays_bare_message()
{   let error = assert_err!(load_config(&json!({"api_key": "k"})));
    assert_eq!(error.to_string(), "chatgpt.model is not defined");
}

#[test]
fn test_provider_config_defaults()
{   let config = ProviderConfig::from_lookup(|_| None);
    assert_eq!(config, ProviderConfig::default());
    assert_eq!(config.api_base, DEFAULT_API_BASE);
    assert_eq!(
      config.completions_url(),
      "https://api.openai.com/v1/chat/completions"
    );
}

#[test]
fn test_provider_config_from_lookup()
{   let config = ProviderConfig::from_lookup(|name| match name
    {   API_BASE_VAR => Some("http://localhost:8080/v1/".to_string())
      , CONNECT_TIMEOUT_VAR => Some(" 15 ".to_string())
      , _ => None
    });
    assert_eq!(config.api_base, "http://localhost:8080/v1");
    assert_eq!(config.connect_timeout_secs, Some(15));
    assert_eq!(
      config.completions_url(),
      "http://localhost:8080/v1/chat/completions"
    );

    let config = ProviderConfig::from_lookup(|name| match name
    {   API_BASE_VAR => Some("  ".to_string())
      , CONNECT_TIMEOUT_VAR => Some("soon".to_string())
      , _ => None
    });
    assert_eq!(config, ProviderConfig::default());
}
