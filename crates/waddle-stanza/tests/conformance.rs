//! Byte-exact round trips of reference stanzas.
//!
//! Each fixture is parsed into typed values, checked field by field, and
//! serialized back to the identical byte sequence.

mod common;

use chrono::{TimeZone, Utc};

use common::{assert_iq_roundtrip, assert_packet_roundtrip, same_tree};
use waddle_stanza::disco::{DiscoInfo, Feature, Identity};
use waddle_stanza::xep::xep0004::FieldType;
use waddle_stanza::xep::xep0078::NonSaslAuth;
use waddle_stanza::xep::xep0092::Version;
use waddle_stanza::xep::xep0115::{parse_caps_node, verification_string, Caps};
use waddle_stanza::xep::xep0202::EntityTime;
use waddle_stanza::{FeatureMode, Iq, IqType, Packet, ParseError, Session};

#[test]
fn test_discovery() {
    let xml = "<iq id=\"disco1\" from=\"benvolio@capulet.lit/230193\" type=\"result\">\
        <query xmlns=\"http://jabber.org/protocol/disco#info\">\
        <identity category=\"client\" name=\"Exodus 0.9.1\" type=\"pc\"/>\
        <feature var=\"http://jabber.org/protocol/caps\"/>\
        <feature var=\"http://jabber.org/protocol/disco#info\"/>\
        <feature var=\"http://jabber.org/protocol/disco#items\"/>\
        <feature var=\"http://jabber.org/protocol/muc\"/>\
        </query>\
        </iq>";

    let iq = assert_iq_roundtrip(xml);
    assert_eq!(iq.type_, IqType::Result);
    assert_eq!(iq.to, None);

    let disco = iq.payload_as::<DiscoInfo>().unwrap();
    assert_eq!(disco.identities, vec![Identity::client_pc(Some("Exodus 0.9.1"))]);
    assert_eq!(disco.features.len(), 4);
    assert_eq!(verification_string(disco), "QgayPKawpkPSDYmwT/WM94uAlu0=");
}

#[test]
fn test_discovery_with_form() {
    let xml = "<iq id=\"disco1\" to=\"juliet@capulet.lit/chamber\" from=\"benvolio@capulet.lit/230193\" type=\"result\">\
        <query xmlns=\"http://jabber.org/protocol/disco#info\" node=\"http://psi-im.org#q07IKJEyjvHSyhy//CH0CxmKi8w=\">\
        <identity xml:lang=\"en\" category=\"client\" name=\"Psi 0.11\" type=\"pc\"/>\
        <identity xml:lang=\"el\" category=\"client\" name=\"Ψ 0.11\" type=\"pc\"/>\
        <feature var=\"http://jabber.org/protocol/caps\"/>\
        <feature var=\"http://jabber.org/protocol/disco#info\"/>\
        <feature var=\"http://jabber.org/protocol/disco#items\"/>\
        <feature var=\"http://jabber.org/protocol/muc\"/>\
        <x xmlns=\"jabber:x:data\" type=\"result\">\
        <field type=\"hidden\" var=\"FORM_TYPE\">\
        <value>urn:xmpp:dataforms:softwareinfo</value>\
        </field>\
        <field type=\"text-multi\" var=\"ip_version\">\
        <value>ipv4</value>\
        <value>ipv6</value>\
        </field>\
        <field type=\"text-single\" var=\"os\">\
        <value>Mac</value>\
        </field>\
        <field type=\"text-single\" var=\"os_version\">\
        <value>10.5.1</value>\
        </field>\
        <field type=\"text-single\" var=\"software\">\
        <value>Psi</value>\
        </field>\
        <field type=\"text-single\" var=\"software_version\">\
        <value>0.11</value>\
        </field>\
        </x>\
        </query>\
        </iq>";

    let iq = assert_iq_roundtrip(xml);
    let disco = iq.payload_as::<DiscoInfo>().unwrap();

    assert_eq!(disco.identities[1].name.as_deref(), Some("Ψ 0.11"));
    assert_eq!(disco.identities[1].lang.as_deref(), Some("el"));

    let form = disco.form.as_ref().unwrap();
    assert_eq!(form.form_type(), Some("urn:xmpp:dataforms:softwareinfo"));
    assert_eq!(form.field("ip_version").unwrap().type_, Some(FieldType::TextMulti));

    let ver = verification_string(disco);
    assert_eq!(ver, "q07IKJEyjvHSyhy//CH0CxmKi8w=");

    // The queried node is the one the entity advertised in its caps.
    let (node, advertised) = parse_caps_node(disco.node.as_deref().unwrap()).unwrap();
    assert_eq!(advertised, ver);
    assert_eq!(Caps::for_disco_info(node, disco).node_ver(), disco.node.clone().unwrap());
}

#[test]
fn test_non_sasl_auth_query() {
    let xml = "<iq id=\"auth1\" to=\"shakespeare.lit\" type=\"get\">\
        <query xmlns=\"jabber:iq:auth\"/>\
        </iq>";

    let iq = assert_iq_roundtrip(xml);
    assert_eq!(iq.payload_as::<NonSaslAuth>(), Some(&NonSaslAuth::new()));
}

#[test]
fn test_non_sasl_auth_plaintext() {
    let xml = "<iq id=\"auth2\" type=\"set\">\
        <query xmlns=\"jabber:iq:auth\">\
        <username>bill</username>\
        <password>Calli0pe</password>\
        <resource>globe</resource>\
        </query>\
        </iq>";

    let iq = assert_iq_roundtrip(xml);
    let auth = iq.payload_as::<NonSaslAuth>().unwrap();
    assert_eq!(auth.username.as_deref(), Some("bill"));
    assert_eq!(auth.digest, None);
    assert_eq!(auth.password.as_deref(), Some("Calli0pe"));
    assert_eq!(auth.resource.as_deref(), Some("globe"));
}

#[test]
fn test_non_sasl_auth_digest() {
    let xml = "<iq id=\"auth2\" type=\"set\">\
        <query xmlns=\"jabber:iq:auth\">\
        <username>bill</username>\
        <digest>48fc78be9ec8f86d8ce1c39c320c97c21d62334d</digest>\
        <resource>globe</resource>\
        </query>\
        </iq>";

    let iq = assert_iq_roundtrip(xml);
    let auth = iq.payload_as::<NonSaslAuth>().unwrap();
    assert_eq!(auth.username.as_deref(), Some("bill"));
    assert_eq!(
        auth.digest.as_deref(),
        Some(&b"\x48\xfc\x78\xbe\x9e\xc8\xf8\x6d\x8c\xe1\xc3\x9c\x32\x0c\x97\xc2\x1d\x62\x33\x4d"[..])
    );
    assert_eq!(auth.password, None);
    assert_eq!(auth.resource.as_deref(), Some("globe"));

    assert_eq!(auth.digest, Some(NonSaslAuth::digest_for("3EE948B0", "Calli0pe")));
}

#[test]
fn test_session() {
    let xml = "<iq id=\"session_1\" to=\"example.com\" type=\"set\">\
        <session xmlns=\"urn:ietf:params:xml:ns:xmpp-session\"/>\
        </iq>";

    let iq = assert_iq_roundtrip(xml);
    assert_eq!(iq.id.as_deref(), Some("session_1"));
    assert_eq!(iq.to.as_deref(), Some("example.com"));
    assert_eq!(iq.type_, IqType::Set);
    assert_eq!(iq.payload_as::<Session>(), Some(&Session));
}

#[test]
fn test_stream_features_empty() {
    let packet = assert_packet_roundtrip("<stream:features/>");
    let Packet::StreamFeatures(features) = packet else {
        panic!("expected stream features");
    };

    assert_eq!(features.bind, FeatureMode::Disabled);
    assert_eq!(features.session, FeatureMode::Disabled);
    assert_eq!(features.non_sasl_auth, FeatureMode::Disabled);
    assert_eq!(features.tls, FeatureMode::Disabled);
    assert!(features.mechanisms.is_empty());
    assert!(features.compression_methods.is_empty());
}

#[test]
fn test_stream_features_enabled() {
    let xml = "<stream:features>\
        <bind xmlns=\"urn:ietf:params:xml:ns:xmpp-bind\"/>\
        <session xmlns=\"urn:ietf:params:xml:ns:xmpp-session\"/>\
        <auth xmlns=\"http://jabber.org/features/iq-auth\"/>\
        <starttls xmlns=\"urn:ietf:params:xml:ns:xmpp-tls\"/>\
        <compression xmlns=\"http://jabber.org/features/compress\"><method>zlib</method></compression>\
        <mechanisms xmlns=\"urn:ietf:params:xml:ns:xmpp-sasl\"><mechanism>PLAIN</mechanism></mechanisms>\
        </stream:features>";

    let packet = assert_packet_roundtrip(xml);
    let Packet::StreamFeatures(features) = packet else {
        panic!("expected stream features");
    };

    assert_eq!(features.bind, FeatureMode::Enabled);
    assert_eq!(features.session, FeatureMode::Enabled);
    assert_eq!(features.non_sasl_auth, FeatureMode::Enabled);
    assert_eq!(features.tls, FeatureMode::Enabled);
    assert_eq!(features.mechanisms, vec!["PLAIN"]);
    assert_eq!(features.compression_methods, vec!["zlib"]);
}

#[test]
fn test_version_get() {
    let xml = "<iq id=\"version_1\" to=\"juliet@capulet.com/balcony\" \
        from=\"romeo@montague.net/orchard\" type=\"get\">\
        <query xmlns=\"jabber:iq:version\"/></iq>";

    let iq = assert_iq_roundtrip(xml);
    assert_eq!(iq.id.as_deref(), Some("version_1"));
    assert_eq!(iq.to.as_deref(), Some("juliet@capulet.com/balcony"));
    assert_eq!(iq.from.as_deref(), Some("romeo@montague.net/orchard"));
    assert_eq!(iq.type_, IqType::Get);
    assert_eq!(iq.payload_as::<Version>(), Some(&Version::query()));
}

#[test]
fn test_version_result() {
    let xml = "<iq id=\"version_1\" to=\"romeo@montague.net/orchard\" \
        from=\"juliet@capulet.com/balcony\" type=\"result\">\
        <query xmlns=\"jabber:iq:version\">\
        <name>qxmpp</name>\
        <os>Windows-XP</os>\
        <version>0.2.0</version>\
        </query></iq>";

    let iq = assert_iq_roundtrip(xml);
    assert_eq!(iq.type_, IqType::Result);

    let version = iq.payload_as::<Version>().unwrap();
    assert_eq!(version.name.as_deref(), Some("qxmpp"));
    assert_eq!(version.version.as_deref(), Some("0.2.0"));
    assert_eq!(version.os.as_deref(), Some("Windows-XP"));
}

#[test]
fn test_entity_time_get() {
    let xml = "<iq id=\"time_1\" \
        to=\"juliet@capulet.com/balcony\" \
        from=\"romeo@montague.net/orchard\" type=\"get\">\
        <time xmlns=\"urn:xmpp:time\"/>\
        </iq>";

    let iq = assert_iq_roundtrip(xml);
    assert_eq!(iq.id.as_deref(), Some("time_1"));
    assert_eq!(iq.type_, IqType::Get);
    assert_eq!(iq.payload_as::<EntityTime>(), Some(&EntityTime::query()));
}

#[test]
fn test_entity_time_result() {
    let xml = "<iq id=\"time_1\" to=\"romeo@montague.net/orchard\" from=\"juliet@capulet.com/balcony\" type=\"result\">\
        <time xmlns=\"urn:xmpp:time\">\
        <tzo>-06:00</tzo>\
        <utc>2006-12-19T17:58:35Z</utc>\
        </time>\
        </iq>";

    let iq = assert_iq_roundtrip(xml);
    assert_eq!(iq.from.as_deref(), Some("juliet@capulet.com/balcony"));
    assert_eq!(iq.to.as_deref(), Some("romeo@montague.net/orchard"));

    let time = iq.payload_as::<EntityTime>().unwrap();
    assert_eq!(time.tzo, Some(-21600));
    assert_eq!(
        time.utc,
        Some(Utc.with_ymd_and_hms(2006, 12, 19, 17, 58, 35).unwrap())
    );
}

#[test]
fn test_required_starttls_roundtrip() {
    let xml = "<stream:features>\
        <starttls xmlns=\"urn:ietf:params:xml:ns:xmpp-tls\"><required/></starttls>\
        </stream:features>";

    let Packet::StreamFeatures(features) = assert_packet_roundtrip(xml) else {
        panic!("expected stream features");
    };
    assert_eq!(features.tls, FeatureMode::Required);
}

#[test]
fn test_empty_request_rejected() {
    let result = Iq::from_xml(b"<iq id=\"x\" type=\"get\"/>");
    assert!(matches!(result, Err(ParseError::UnrecognizedPayload(_))));
}

#[test]
fn test_builder_output_matches_fixture() {
    let built = Iq::new(IqType::Result)
        .with_id("disco1")
        .with_from("benvolio@capulet.lit/230193")
        .with_payload(
            DiscoInfo::new()
                .with_identity(Identity::client_pc(Some("Exodus 0.9.1")))
                .with_features([
                    Feature::caps(),
                    Feature::disco_info(),
                    Feature::disco_items(),
                    Feature::muc(),
                ]),
        );

    let fixture = "<iq id=\"disco1\" from=\"benvolio@capulet.lit/230193\" type=\"result\">\
        <query xmlns='http://jabber.org/protocol/disco#info'>\
        <identity category='client' name='Exodus 0.9.1' type='pc'/>\
        <feature var='http://jabber.org/protocol/caps'/>\
        <feature var='http://jabber.org/protocol/disco#info'/>\
        <feature var='http://jabber.org/protocol/disco#items'/>\
        <feature var='http://jabber.org/protocol/muc'/>\
        </query></iq>";

    assert!(same_tree(&built.to_xml(), fixture).unwrap());
}
