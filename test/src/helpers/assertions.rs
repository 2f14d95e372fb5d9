/// Asserts the kinds of packets a viewer received, in order
#[macro_export]
macro_rules! assert_packet_kinds {
    ($sink:expr, $viewer:expr, [$($kind:ident),* $(,)?]) => {
        let packets = $sink.packets_for($viewer);
        let kinds: Vec<&'static str> = packets
            .iter()
            .map(|packet| match packet {
                $crate::RecordedPacket::Spawn(_) => "Spawn",
                $crate::RecordedPacket::Metadata(_) => "Metadata",
                $crate::RecordedPacket::Destroy(_) => "Destroy",
                $crate::RecordedPacket::Passengers(_) => "Passengers",
                $crate::RecordedPacket::Unknown(_) => "Unknown",
            })
            .collect();
        let expected: Vec<&'static str> = vec![$(stringify!($kind)),*];
        assert_eq!(kinds, expected, "packets received by {:?}", $viewer);
    };
}
