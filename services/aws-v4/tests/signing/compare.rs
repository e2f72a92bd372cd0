//! Compare our signatures with the ones produced by `aws-sigv4`.

use std::time::{Duration, SystemTime};

use super::{init_logger, ACCESS_KEY, SECRET_KEY};
use anyhow::Result;
use aws_sigv4::http_request::{SignableBody, SignableRequest, SignatureLocation, SigningSettings};
use aws_sigv4::sign::v4::SigningParams;
use ec2sign_aws_v4::{Credential, RequestSigner, SigningContext};
use ec2sign_core::time::{now, DateTime};
use ec2sign_core::{SignRequest, SigningMethod};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Request;
use pretty_assertions::assert_eq;

const ENDPOINT: &str = "ec2.us-east-1.amazonaws.com";
const SESSION_TOKEN: &str = "AQoDYXdzEPT//////////wEXAMPLEtc764";

fn test_get_request() -> Request<&'static str> {
    Request::get("https://ec2.us-east-1.amazonaws.com/")
        .body("")
        .expect("request must be valid")
}

fn test_get_request_with_query() -> Request<&'static str> {
    Request::get("https://ec2.us-east-1.amazonaws.com/?Action=DescribeInstances&Version=2016-11-15")
        .body("")
        .expect("request must be valid")
}

fn test_get_request_with_special_chars() -> Request<&'static str> {
    Request::get(
        "https://ec2.us-east-1.amazonaws.com/\
         ?Action=DescribeInstances\
         &Filter.1.Name=tag%3Aaws%3Arole\
         &Filter.1.Value.1=hz%20cluster%2F1%20~%2A\
         &Version=2016-11-15",
    )
    .body("")
    .expect("request must be valid")
}

fn test_post_request() -> Request<&'static str> {
    Request::post("https://ec2.us-east-1.amazonaws.com/")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=utf-8")
        .body("Action=DescribeInstances&Version=2016-11-15")
        .expect("request must be valid")
}

fn test_get_request_with_repeated_header() -> Request<&'static str> {
    Request::get("https://ec2.us-east-1.amazonaws.com/?Action=DescribeInstances&Version=2016-11-15")
        .header("x-amz-meta", "one")
        .header("x-amz-meta", "two")
        .body("")
        .expect("request must be valid")
}

fn test_cases() -> &'static [fn() -> Request<&'static str>] {
    &[
        test_get_request,
        test_get_request_with_query,
        test_get_request_with_special_chars,
        test_post_request,
        test_get_request_with_repeated_header,
    ]
}

/// Presigned urls are only used for body-less requests.
fn query_test_cases() -> &'static [fn() -> Request<&'static str>] {
    &[
        test_get_request,
        test_get_request_with_query,
        test_get_request_with_special_chars,
    ]
}

/// Signature computed by `aws-sigv4` for the given request.
fn aws_sigv4_signature(
    req: &Request<&str>,
    time: DateTime,
    session_token: Option<&str>,
    expires: Option<Duration>,
) -> Result<String> {
    let mut settings = SigningSettings::default();
    if let Some(expires) = expires {
        settings.signature_location = SignatureLocation::QueryParams;
        settings.expires_in = Some(expires);
    }

    let identity = aws_credential_types::Credentials::new(
        ACCESS_KEY,
        SECRET_KEY,
        session_token.map(str::to_string),
        None,
        "test",
    )
    .into();
    let params = SigningParams::builder()
        .identity(&identity)
        .region("us-east-1")
        .name("ec2")
        .time(SystemTime::from(time))
        .settings(settings)
        .build()?
        .into();

    let headers = req
        .headers()
        .iter()
        .map(|(k, v)| Ok((k.as_str(), v.to_str()?)))
        .collect::<Result<Vec<_>>>()?;
    let uri = req.uri().to_string();
    let output = aws_sigv4::http_request::sign(
        SignableRequest::new(
            req.method().as_str(),
            uri.as_str(),
            headers.into_iter(),
            SignableBody::Bytes(req.body().as_bytes()),
        )?,
        &params,
    )?;

    Ok(output.signature().to_string())
}

fn signer(time: DateTime) -> Result<RequestSigner> {
    Ok(RequestSigner::new(SigningContext::new(
        "us-east-1",
        "ec2",
        ENDPOINT,
        time,
    )?))
}

fn signature_from_header(req: &Request<&str>) -> String {
    let value = req.headers()[AUTHORIZATION]
        .to_str()
        .expect("authorization must be valid");
    value
        .rsplit_once("Signature=")
        .expect("authorization must carry a signature")
        .1
        .to_string()
}

fn signature_from_query(req: &Request<&str>) -> String {
    form_urlencoded::parse(req.uri().query().unwrap_or_default().as_bytes())
        .find(|(k, _)| k == "X-Amz-Signature")
        .map(|(_, v)| v.to_string())
        .expect("query must carry a signature")
}

fn sign(
    req_fn: &fn() -> Request<&'static str>,
    time: DateTime,
    cred: &Credential,
    method: SigningMethod,
) -> Result<Request<&'static str>> {
    let (mut parts, body) = req_fn().into_parts();
    signer(time)?.sign_request(&mut parts, body.as_bytes(), Some(cred), method)?;
    Ok(Request::from_parts(parts, body))
}

#[test]
fn test_calculate() -> Result<()> {
    init_logger();

    for req_fn in test_cases() {
        let time = now();
        let cred = Credential::new(ACCESS_KEY, SECRET_KEY);

        let expected = aws_sigv4_signature(&req_fn(), time, None, None)?;
        let actual = sign(req_fn, time, &cred, SigningMethod::Header)?;

        assert_eq!(signature_from_header(&actual), expected, "{}", req_fn().uri());
    }
    Ok(())
}

#[test]
fn test_calculate_with_token() -> Result<()> {
    init_logger();

    for req_fn in test_cases() {
        let time = now();
        let cred = Credential::new(ACCESS_KEY, SECRET_KEY).with_session_token(SESSION_TOKEN);

        let expected = aws_sigv4_signature(&req_fn(), time, Some(SESSION_TOKEN), None)?;
        let actual = sign(req_fn, time, &cred, SigningMethod::Header)?;

        assert_eq!(signature_from_header(&actual), expected, "{}", req_fn().uri());
    }
    Ok(())
}

#[test]
fn test_calculate_in_query() -> Result<()> {
    init_logger();

    let expires = Duration::from_secs(300);
    for req_fn in query_test_cases() {
        let time = now();
        let cred = Credential::new(ACCESS_KEY, SECRET_KEY);

        let expected = aws_sigv4_signature(&req_fn(), time, None, Some(expires))?;
        let actual = sign(req_fn, time, &cred, SigningMethod::Query(expires))?;

        assert_eq!(signature_from_query(&actual), expected, "{}", req_fn().uri());
    }
    Ok(())
}

#[test]
fn test_calculate_with_token_in_query() -> Result<()> {
    init_logger();

    let expires = Duration::from_secs(300);
    for req_fn in query_test_cases() {
        let time = now();
        let cred = Credential::new(ACCESS_KEY, SECRET_KEY).with_session_token(SESSION_TOKEN);

        let expected = aws_sigv4_signature(&req_fn(), time, Some(SESSION_TOKEN), Some(expires))?;
        let actual = sign(req_fn, time, &cred, SigningMethod::Query(expires))?;

        assert_eq!(signature_from_query(&actual), expected, "{}", req_fn().uri());
    }
    Ok(())
}

#[test]
fn test_calculate_with_repeated_header() -> Result<()> {
    init_logger();

    let time = now();
    let cred = Credential::new(ACCESS_KEY, SECRET_KEY);
    let req_fn: fn() -> Request<&'static str> = test_get_request_with_repeated_header;

    let expected = aws_sigv4_signature(&req_fn(), time, None, None)?;
    let actual = sign(&req_fn, time, &cred, SigningMethod::Header)?;

    assert_eq!(actual.headers().get_all("x-amz-meta").iter().count(), 2);
    assert_eq!(signature_from_header(&actual), expected);
    Ok(())
}
