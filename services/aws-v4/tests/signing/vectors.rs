use super::{credential, ecs_signer, init_logger, suite_signer};
use anyhow::Result;
use ec2sign_aws_v4::derive_signing_key;
use http::Method;
use pretty_assertions::assert_eq;
use test_case::test_case;

const SUITE_DATE: &str = "20150830T123600Z";

#[test_case(Method::GET, &[], &[("X-Amz-Date", SUITE_DATE)], b"",
    "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"; "get vanilla")]
#[test_case(Method::GET, &[("Param2", "value2"), ("Param1", "value1")], &[("X-Amz-Date", SUITE_DATE)], b"",
    "b97d918cfa904a5beff61c982a1b6f458b799221646efd99d3219ec94cdf2500"; "get vanilla query order key case")]
#[test_case(Method::GET, &[("ሴ", "bar")], &[("X-Amz-Date", SUITE_DATE)], b"",
    "2cdec8eed098649ff3a119c94853b13c643bcf08f8b0a1d91e12c9027818dd04"; "get vanilla utf8 query")]
#[test_case(Method::POST, &[], &[("X-Amz-Date", SUITE_DATE)], b"",
    "5da7c1a2acd57cee7505fc6676e4e544621c30862966e37dddb68e92efbe5d6b"; "post vanilla")]
#[test_case(Method::POST, &[],
    &[("X-Amz-Date", SUITE_DATE), ("Content-Type", "application/x-www-form-urlencoded")],
    b"Param1=value1",
    "ff11897932ad3f4e8b18135d722051e5ac45fc38421b1da7b9d196a0fe09473a"; "post x www form urlencoded")]
fn test_published_suite(
    method: Method,
    attributes: &[(&str, &str)],
    headers: &[(&str, &str)],
    body: &[u8],
    expected: &str,
) {
    init_logger();

    let result = suite_signer()
        .sign_with_body(
            &credential(),
            attributes.iter().copied(),
            headers.iter().copied(),
            body,
            &method,
        )
        .expect("sign must succeed");

    assert_eq!(result.signature(), expected);
    assert_eq!(
        result.authorization_header(),
        format!(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
             SignedHeaders={}, Signature={expected}",
            result.signed_headers()
        )
    );
}

#[test]
fn test_ecs_signing_key() -> Result<()> {
    let signer = ecs_signer();
    let key = derive_signing_key(&credential().secret_access_key, signer.context())?;

    assert_eq!(
        hex::encode(key.as_bytes()),
        "ac8d19964fcea9428c6cf191526249112adf5547331898b190239b834fbb7c9e"
    );
    Ok(())
}

#[test]
fn test_ecs_describe_instances_in_query() -> Result<()> {
    init_logger();

    let signer = ecs_signer();
    let cred = credential();
    let formatted = signer.formatted_credential(&cred);
    assert_eq!(
        formatted,
        "AKIDEXAMPLE/20141106/eu-central-1/ecs/aws4_request"
    );

    let attributes = vec![
        ("Action", "DescribeInstances"),
        ("Version", "2016-11-15"),
        ("X-Amz-Algorithm", "AWS4-HMAC-SHA256"),
        ("X-Amz-Credential", formatted.as_str()),
        ("X-Amz-Date", "20141106T111126Z"),
        ("X-Amz-SignedHeaders", "host"),
    ];
    let headers: Vec<(&str, &str)> = vec![];
    let result = signer.sign(&cred, attributes, headers)?;

    assert_eq!(
        result.signature(),
        "e299302b73977239673e606dcd6b2495fea32bf9fa3c3df5f1393529688c9303"
    );
    assert_eq!(result.signed_headers(), "host");
    Ok(())
}

#[test]
fn test_ecs_describe_instances_in_header() -> Result<()> {
    init_logger();

    let result = ecs_signer().sign(
        &credential(),
        [("Action", "DescribeInstances"), ("Version", "2016-11-15")],
        [("X-Amz-Date", "20141106T111126Z")],
    )?;

    assert_eq!(
        result.signature(),
        "33c9966552dc562c191eb6a7a0b2b42d3bdb8bb8e02ae8b6af3e1692784a6d16"
    );
    assert_eq!(
        result.authorization_header(),
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20141106/eu-central-1/ecs/aws4_request, \
         SignedHeaders=host;x-amz-date, \
         Signature=33c9966552dc562c191eb6a7a0b2b42d3bdb8bb8e02ae8b6af3e1692784a6d16"
    );
    Ok(())
}
