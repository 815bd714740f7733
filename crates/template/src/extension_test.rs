use super::*;
use serde_json::json;

fn names(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}

fn math_module() -> StaticModule {
    StaticModule::new("math")
        .with_function("Double", |args: &[Value]| {
            Ok(json!(args[0].as_i64().unwrap_or(0) * 2))
        })
        .with_value("Version", json!("1.0"))
}

#[test]
fn test_builtins_contain_username() {
    let registry = ExtensionRegistry::with_builtins();
    assert!(registry.contains("username"));
    assert_eq!(registry.available_modules(), vec!["username"]);
}

#[test]
fn test_username_initials() {
    let registry = ExtensionRegistry::with_builtins();
    let imported = registry.load("username", &names(&["Username"])).unwrap();
    let f = &imported[0].1;

    assert_eq!(f.call(&[json!("Jean Paul"), json!("Sartre")]).unwrap(), json!("JPSartre"));
    assert_eq!(f.call(&[json!("Ada"), json!("Lovelace")]).unwrap(), json!("ALovelace"));
    assert_eq!(f.call(&[json!("Ada  Mae"), json!("X")]).unwrap(), json!("AMX"));
    assert!(f.call(&[json!("Ada")]).is_err());
}

#[test]
fn test_load_function() {
    let mut registry = ExtensionRegistry::new();
    registry.register(math_module());

    let imported = registry.load("math", &names(&["Double"])).unwrap();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].0, "Double");
    assert_eq!(imported[0].1.call(&[json!(21)]).unwrap(), json!(42));
}

#[test]
fn test_load_value_is_invalid_signature() {
    let mut registry = ExtensionRegistry::new();
    registry.register(math_module());

    let err = registry.load("math", &names(&["Version"])).err().unwrap();
    assert!(matches!(
        err,
        TemplateError::InvalidExtensionSignature { ref module, ref symbol }
            if module == "math" && symbol == "Version"
    ));
}

#[test]
fn test_load_unknown_module() {
    let registry = ExtensionRegistry::with_builtins();
    let err = registry.load("geo", &names(&["Distance"])).err().unwrap();
    assert!(matches!(err, TemplateError::ExtensionLoad { ref module, .. } if module == "geo"));
    assert!(err.to_string().contains("username"));
}

#[test]
fn test_load_unknown_symbol() {
    let registry = ExtensionRegistry::with_builtins();
    let err = registry.load("username", &names(&["Nickname"])).err().unwrap();
    assert!(err.to_string().contains("Nickname"));
}

#[test]
fn test_try_register_duplicate() {
    let mut registry = ExtensionRegistry::new();
    assert!(registry.try_register(math_module()));
    assert!(!registry.try_register(math_module()));
}

#[test]
#[should_panic(expected = "already registered")]
fn test_register_duplicate_panics() {
    let mut registry = ExtensionRegistry::with_builtins();
    registry.register(StaticModule::new("username"));
}

#[test]
fn test_static_module_symbols() {
    let module = math_module();
    assert_eq!(module.name(), "math");
    assert_eq!(module.symbols(), vec!["Double", "Version"]);
    assert!(matches!(module.lookup("Version"), Some(Symbol::Value(_))));
    assert!(module.lookup("Missing").is_none());
}
